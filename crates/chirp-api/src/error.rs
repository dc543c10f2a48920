//! API error types

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response was received.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request rejected"))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Rejected { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "network",
            ApiError::Rejected { .. } => "rejected",
            ApiError::Malformed(_) => "malformed",
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::Client(_) => "client",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull `{"message": "..."}` out of an error body. Blank messages count as absent.
pub(crate) fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
