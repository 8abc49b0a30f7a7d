//! Errors raised while talking to the content source

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("failed to read response: {0}")]
    Body(#[from] reqwest::Error),

    #[error("content source returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid content source endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("content source is not configured: {0}")]
    Config(String),
}

impl CmsError {
    /// Whether the source rejected the request because a referenced
    /// property does not exist (or has another type) in the database.
    pub fn is_schema_error(&self) -> bool {
        match self {
            CmsError::Api { code, message, .. } => {
                code == "validation_error" && message.to_ascii_lowercase().contains("property")
            }
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::Api { code, .. } if code == "object_not_found")
    }
}
