use std::env;

use thiserror::Error;

/// API key accepted by a local Grafbase dev server.
const LOCAL_API_KEY: &str = "letmein";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} is not a valid value for {1}")]
    Invalid(String, &'static str),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub grafbase_api_url: String,
    pub grafbase_api_key: String,
    pub is_production: bool,
    pub server_url: String,
    pub client_url: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub auth_redirect_url: String,
    pub session_secret: String,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| get(key).filter(|v| !v.is_empty()).ok_or(ConfigError::Missing(key));

        let is_production = get("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let grafbase_api_key = if is_production {
            required("GRAFBASE_API_KEY")?
        } else {
            get("GRAFBASE_API_KEY").unwrap_or_else(|| LOCAL_API_KEY.to_string())
        };

        let server_port = match get("SERVER_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| ConfigError::Invalid(port, "SERVER_PORT"))?,
            None => 8080,
        };

        Ok(Config {
            grafbase_api_url: required("GRAFBASE_API_URL")?,
            grafbase_api_key,
            is_production,
            server_url: get("SERVER_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            client_url: get("CLIENT_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            auth_redirect_url: get("AUTH_REDIRECT_URL")
                .unwrap_or_else(|| "http://localhost:8080/auth/callback/google".to_string()),
            session_secret: required("SESSION_SECRET")?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
