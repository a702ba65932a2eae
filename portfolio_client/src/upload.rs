use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ClientError, ClientResult};

static BASE64_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/[a-z]+;base64,").expect("static pattern compiles")
});

/// True when `value` is an inline image that still needs hosting.
pub fn is_base64_data_url(value: &str) -> bool {
    BASE64_IMAGE.is_match(value)
}

/// Turns an image reference into a hosted URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, image: &str) -> ClientResult<String>;
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    url: Option<String>,
}

/// Posts `{"path": image}` to the site's upload endpoint.
#[derive(Clone, Debug)]
pub struct HttpImageUploader {
    http: reqwest::Client,
    upload_url: String,
}

impl HttpImageUploader {
    pub fn new(http: reqwest::Client, server_url: &str) -> Self {
        Self {
            http,
            upload_url: format!("{}/api/upload", server_url.trim_end_matches('/')),
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

#[async_trait]
impl ImageUploader for HttpImageUploader {
    async fn upload(&self, image: &str) -> ClientResult<String> {
        let response = self
            .http
            .post(&self.upload_url)
            .json(&json!({ "path": image }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Image upload request failed: {}", e);
                ClientError::Upload(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Image upload failed: status={}", status);
            return Err(ClientError::Upload(format!("status {}", status)));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Upload(format!("unreadable response: {}", e)))?;

        match body.url {
            Some(url) if !url.is_empty() => {
                tracing::debug!("Image hosted at {}", url);
                Ok(url)
            }
            _ => Err(ClientError::Upload("response carried no url".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{routing::post, Json, Router};
    use serde_json::Value;

    use super::*;

    async fn serve_upload(reply: Value) -> String {
        let app = Router::new().route(
            "/api/upload",
            post(move |Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    assert!(body.get("path").is_some());
                    Json(reply)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn detects_inline_images() {
        assert!(is_base64_data_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(is_base64_data_url("data:image/jpeg;base64,/9j/4AAQ"));
        assert!(!is_base64_data_url("https://res.cloudinary.com/x.png"));
        assert!(!is_base64_data_url("data:text/plain;base64,aGk="));
        assert!(!is_base64_data_url(" data:image/png;base64,"));
    }

    #[test]
    fn upload_url_is_built_from_server_url() {
        let uploader = HttpImageUploader::new(reqwest::Client::new(), "http://localhost:3000/");
        assert_eq!(uploader.upload_url(), "http://localhost:3000/api/upload");
    }

    #[tokio::test]
    async fn returns_hosted_url() {
        let server = serve_upload(json!({ "url": "https://cdn.example.com/a.png" })).await;
        let uploader = HttpImageUploader::new(reqwest::Client::new(), &server);

        let url = uploader.upload("data:image/png;base64,AAAA").await.unwrap();
        assert_eq!(url, "https://cdn.example.com/a.png");
    }

    #[tokio::test]
    async fn missing_url_is_an_upload_error() {
        let server = serve_upload(json!({ "error": "too large" })).await;
        let uploader = HttpImageUploader::new(reqwest::Client::new(), &server);

        let err = uploader.upload("data:image/png;base64,AAAA").await.unwrap_err();
        assert!(matches!(err, ClientError::Upload(_)));
    }
}
