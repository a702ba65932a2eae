use thiserror::Error;

/// Every failure the data-access layer can report.
///
/// The variants only exist so the logs can tell transport trouble from a
/// backend rejection; callers are expected to treat them alike.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to make GraphQL request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GraphQL request returned errors: {0}")]
    GraphQL(String),

    #[error("GraphQL endpoint responded with status {0}")]
    Status(u16),

    #[error("GraphQL response carried no data")]
    EmptyResponse,

    #[error("Failed to decode GraphQL response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("Invalid project form: {0}")]
    Validation(String),
}

impl ClientError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
