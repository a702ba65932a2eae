//! Thin GraphQL transport.
//!
//! Every call carries its own [`RequestContext`], so the shared
//! [`GraphQLClient`] never holds per-request header state and concurrent
//! calls with different credentials cannot observe each other's headers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Credential attached to a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Auth {
    /// Public reads and user bootstrap.
    ApiKey(String),
    /// Owner-gated mutations, carrying the session token.
    Bearer(String),
}

/// Endpoint plus credential for one GraphQL call.
#[derive(Clone, Debug)]
pub struct RequestContext {
    endpoint: String,
    auth: Auth,
}

impl RequestContext {
    pub fn new(endpoint: impl Into<String>, auth: Auth) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Exactly one auth header, never both.
    pub fn headers(&self) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        match &self.auth {
            Auth::ApiKey(key) => {
                headers.insert(API_KEY_HEADER, HeaderValue::from_str(key)?);
            }
            Auth::Bearer(token) => {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token))?,
                );
            }
        }
        Ok(headers)
    }
}

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQLErrorEntry>>,
}

#[derive(Deserialize)]
struct GraphQLErrorEntry {
    #[serde(default)]
    message: String,
}

#[derive(Clone, Debug)]
pub struct GraphQLClient {
    http: reqwest::Client,
}

impl GraphQLClient {
    pub fn new() -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }

    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// POST `{query, variables}` and decode `data` into `T`.
    ///
    /// Transport failures, non-2xx statuses, a non-empty `errors` array and a
    /// missing `data` member all reject.
    pub async fn request<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        query: &str,
        variables: Value,
    ) -> ClientResult<T> {
        let response = self
            .http
            .post(ctx.endpoint())
            .headers(ctx.headers()?)
            .json(&GraphQLRequest {
                query,
                variables: &variables,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("GraphQL request error: {}", e);
                ClientError::Transport(e)
            })?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!("GraphQL server temporarily unavailable");
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "GraphQL request failed");
            return Err(ClientError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let body: GraphQLResponse<T> = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("GraphQL response decode error: {}", e);
            ClientError::Decode(e)
        })?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join("; ");
            tracing::error!("GraphQL errors: {}", message);
            return Err(ClientError::GraphQL(message));
        }

        body.data.ok_or(ClientError::EmptyResponse)
    }
}
