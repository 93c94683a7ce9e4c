//! Errors returned by configuration API calls

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read
    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{status}")]
    Status { status: StatusCode, body: String },

    /// The response body did not match the expected model
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Raw body of the HTTP response, when the server sent one
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
