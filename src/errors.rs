use thiserror::Error;

/// Every failure the client can surface. The `Display` text is what the
/// front end shows the user; nothing downstream inspects more than that.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Failed to load contacts: {0}")]
    FetchFailed(String),

    #[error("Failed to save contact: {0}")]
    SaveFailed(String),

    #[error("Failed to delete contact: {0}")]
    DeleteFailed(String),

    #[error("Operation cancelled, result discarded")]
    Cancelled,

    #[error("{0} Not found")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error while accessing a file or resource: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// True for the failures that mean the server no longer accepts us.
    pub fn is_session_loss(&self) -> bool {
        matches!(self, AppError::SessionExpired | AppError::NotAuthenticated)
    }
}
