use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use agora_types::api::ErrorResponse;
use agora_types::validate::ValidationError;

/// Every handler failure. The `Display` string is what the caller sees in
/// `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    /// Same message for unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    /// Store or runtime failure. `context` goes to the caller, `cause` only
    /// to the log.
    #[error("{context}")]
    Internal {
        context: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    /// `map_err` adapter for store calls.
    pub fn internal(context: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| Self::Internal { context, cause }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingToken | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        Self::BadRequest("Invalid request body")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal { context, cause } = &self {
            error!("{}: {:#}", context, cause);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            ApiError::from(ValidationError::InvalidEmail).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("User not found").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("Email already registered").status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_error_hides_cause() {
        let err = ApiError::internal("Failed to retrieve users")(anyhow::anyhow!("disk I/O error"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to retrieve users");
    }

    #[test]
    fn validation_message_passes_through() {
        let err = ApiError::from(ValidationError::PasswordTooShort);
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }
}
