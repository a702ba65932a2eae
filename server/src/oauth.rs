//! Google authorization-code flow.
//!
//! Only the resulting profile (name, email, picture) is consumed; token
//! issuance stays with Google. Pending sign-ins are tracked by their CSRF
//! `state` value in memory and expire after [`STATE_TTL`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::OAuthProfile;

pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Upper bound on sign-ins awaiting their callback. The oldest is dropped
/// to make room.
pub const MAX_PENDING_STATES: usize = 10_000;

const SCOPES: &str = "openid email profile";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{what} failed: status={status}, body={body}")]
    Status {
        what: &'static str,
        status: u16,
        body: String,
    },
}

/// Provider endpoints; overridable so tests can point at a local server.
#[derive(Clone, Debug)]
pub struct ProviderEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl ProviderEndpoints {
    pub fn google() -> Self {
        Self {
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    endpoints: ProviderEndpoints,
    pending: Arc<DashMap<String, Instant>>,
    max_pending: usize,
}

impl GoogleOAuth {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self::with_endpoints(http, config, ProviderEndpoints::google())
    }

    pub fn with_endpoints(http: reqwest::Client, config: &Config, endpoints: ProviderEndpoints) -> Self {
        Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.auth_redirect_url.clone(),
            endpoints,
            pending: Arc::new(DashMap::new()),
            max_pending: MAX_PENDING_STATES,
        }
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    /// Register a fresh CSRF state and return the provider URL to send the
    /// browser to.
    pub fn authorize_url(&self) -> String {
        self.pending.retain(|_, created| created.elapsed() < STATE_TTL);
        while self.pending.len() >= self.max_pending {
            let oldest = self
                .pending
                .iter()
                .min_by_key(|entry| *entry.value())
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.pending.remove(&key);
                }
                None => break,
            }
        }

        let state = Uuid::new_v4().to_string();
        self.pending.insert(state.clone(), Instant::now());

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.endpoints.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(SCOPES),
            urlencoding::encode(&state),
        )
    }

    /// Consume a state value. Unknown, reused or expired states are refused.
    pub fn take_state(&self, state: &str) -> bool {
        match self.pending.remove(state) {
            Some((_, created)) => created.elapsed() < STATE_TTL,
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_url.as_str()),
        ];

        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Status {
                what: "Token exchange",
                status,
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, OAuthError> {
        let response = self
            .http
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Status {
                what: "Profile fetch",
                status,
                body,
            });
        }

        let user: GoogleUser = response.json().await?;
        Ok(OAuthProfile {
            sub: user.id,
            name: user.name,
            email: user.email,
            image: user.picture,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::{
        routing::{get, post},
        Form, Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    use super::*;

    pub(crate) fn test_config() -> Config {
        Config {
            grafbase_api_url: "http://127.0.0.1:1/graphql".to_string(),
            grafbase_api_key: "letmein".to_string(),
            is_production: false,
            server_url: "http://127.0.0.1:1".to_string(),
            client_url: "http://localhost:3000".to_string(),
            google_client_id: "client-id".to_string(),
            google_client_secret: "client-secret".to_string(),
            auth_redirect_url: "http://localhost:8080/auth/callback/google".to_string(),
            session_secret: "test-secret".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
        }
    }

    /// Token and userinfo endpoints that accept code `good-code` only.
    pub(crate) async fn fake_google() -> ProviderEndpoints {
        let app = Router::new()
            .route(
                "/token",
                post(|Form(params): Form<HashMap<String, String>>| async move {
                    if params.get("code").map(String::as_str) == Some("good-code")
                        && params.get("grant_type").map(String::as_str) == Some("authorization_code")
                    {
                        (axum::http::StatusCode::OK, Json(json!({ "access_token": "access-1", "token_type": "Bearer" })))
                    } else {
                        (axum::http::StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })))
                    }
                }),
            )
            .route(
                "/userinfo",
                get(|| async {
                    Json(json!({
                        "id": "google-42",
                        "email": "ada@example.com",
                        "name": "Ada",
                        "picture": "https://lh3.googleusercontent.com/ada"
                    }))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        ProviderEndpoints {
            authorize_url: format!("http://{}/authorize", addr),
            token_url: format!("http://{}/token", addr),
            userinfo_url: format!("http://{}/userinfo", addr),
        }
    }

    fn state_from(url: &str) -> String {
        url.split("state=").nth(1).unwrap().to_string()
    }

    #[test]
    fn authorize_url_carries_client_and_state() {
        let oauth = GoogleOAuth::new(reqwest::Client::new(), &test_config());

        let url = oauth.authorize_url();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fcallback%2Fgoogle"));
        assert_eq!(oauth.pending_count(), 1);
    }

    #[test]
    fn state_is_single_use() {
        let oauth = GoogleOAuth::new(reqwest::Client::new(), &test_config());
        let state = state_from(&oauth.authorize_url());

        assert!(oauth.take_state(&state));
        assert!(!oauth.take_state(&state));
        assert!(!oauth.take_state("forged"));
    }

    #[test]
    fn expired_state_is_refused() {
        let oauth = GoogleOAuth::new(reqwest::Client::new(), &test_config());
        let Some(created) = Instant::now().checked_sub(STATE_TTL + Duration::from_secs(1)) else {
            return;
        };
        oauth.pending.insert("old".to_string(), created);

        assert!(!oauth.take_state("old"));
    }

    #[test]
    fn pending_states_are_capped_oldest_first() {
        let mut oauth = GoogleOAuth::new(reqwest::Client::new(), &test_config());
        oauth.max_pending = 2;
        let first = state_from(&oauth.authorize_url());
        std::thread::sleep(Duration::from_millis(2));
        let second = state_from(&oauth.authorize_url());
        std::thread::sleep(Duration::from_millis(2));
        let third = state_from(&oauth.authorize_url());

        assert_eq!(oauth.pending_count(), 2);
        assert!(!oauth.take_state(&first));
        assert!(oauth.take_state(&second));
        assert!(oauth.take_state(&third));
    }

    #[tokio::test]
    async fn exchanges_code_and_reads_profile() {
        let endpoints = fake_google().await;
        let oauth = GoogleOAuth::with_endpoints(reqwest::Client::new(), &test_config(), endpoints);

        let token = oauth.exchange_code("good-code").await.unwrap();
        let profile = oauth.fetch_profile(&token).await.unwrap();

        assert_eq!(token, "access-1");
        assert_eq!(profile.sub, "google-42");
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn rejected_code_reports_status() {
        let endpoints = fake_google().await;
        let oauth = GoogleOAuth::with_endpoints(reqwest::Client::new(), &test_config(), endpoints);

        let err = oauth.exchange_code("bad-code").await.unwrap_err();
        assert!(matches!(err, OAuthError::Status { status: 400, .. }));
    }
}
