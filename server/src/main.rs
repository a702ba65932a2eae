mod app;
mod config;
mod errors;
mod handlers;
mod identity;
mod middleware;
mod models;
mod oauth;
mod routes;
mod state;

use std::error::Error;

use portfolio_client::GraphQLClient;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "server=debug,portfolio_client=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr = config.server_addr();
    if !config.is_production {
        tracing::info!("Using local backend at {}", config.grafbase_api_url);
    }

    let state = AppState::new(config, GraphQLClient::new()?);
    let app = app::build_router(state)?;

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
