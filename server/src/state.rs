use std::sync::Arc;

use portfolio_client::{GraphQLClient, HttpImageUploader, PortfolioClient};

use crate::config::Config;
use crate::identity::IdentityBridge;
use crate::oauth::GoogleOAuth;

/// Shared, immutable application state; cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: PortfolioClient,
    pub identity: IdentityBridge,
    pub oauth: GoogleOAuth,
}

impl AppState {
    pub fn new(config: Config, gql: GraphQLClient) -> Self {
        let uploader = HttpImageUploader::new(gql.http().clone(), &config.server_url);
        let client = PortfolioClient::new(
            gql.clone(),
            config.grafbase_api_url.clone(),
            config.grafbase_api_key.clone(),
            Arc::new(uploader),
        );
        let identity = IdentityBridge::new(Arc::new(client.clone()));
        let oauth = GoogleOAuth::new(gql.http().clone(), &config);

        AppState {
            config: Arc::new(config),
            client,
            identity,
            oauth,
        }
    }
}
