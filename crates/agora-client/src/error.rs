use reqwest::StatusCode;
use thiserror::Error;

use agora_types::validate::ValidationError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The call needs a token and the session has none.
    #[error("Please log in first.")]
    NotLoggedIn,

    /// Rejected locally before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server answered with an error status.
    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed session token")]
    MalformedToken,
}

impl ClientError {
    /// Status code for server-side failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}
