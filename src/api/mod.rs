pub mod client;

pub use client::ApiClient;

use crate::domain::Contact;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub const HEALTHY: &str = "healthy";

/// What a single REST call can fail with, before the caller decides what
/// the failure means for the session or the contact cache.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("server rejected the credentials")]
    Unauthorized,

    #[error("server responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("cannot build request url: {0}")]
    Url(String),

    #[error("unexpected response body: {0}")]
    Body(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY
    }
}

/// Successful answer to a create or update. Servers either echo the stored
/// record or only acknowledge the write with `{"message": ..}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReply {
    Stored(Contact),
    Acknowledged(String),
}

impl SaveReply {
    pub(crate) fn from_body(body: &str) -> Result<Self, ApiError> {
        match serde_json::from_str::<Contact>(body) {
            Ok(contact) => Ok(SaveReply::Stored(contact)),
            Err(e) => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|parsed| parsed.message)
                .map(SaveReply::Acknowledged)
                .ok_or(ApiError::Body(e)),
        }
    }
}

/// Error bodies come back as `{"message": ..}` or `{"error": ..}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}
