//! Error types for tidepub.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Variants carry the internal reason for a failure; the translation to an
/// HTTP status and wire code happens only here, in [`AppError::status_code`]
/// and [`AppError::error_code`]. Visibility failures deliberately share the
/// display text and wire code of the matching not-found variant so that the
/// existence of restricted posts never leaks through the response.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Reply target not found: {0}")]
    ReplyTargetNotFound(String),

    // Same message as ReplyTargetNotFound on purpose.
    #[error("Reply target not found: {0}")]
    ReplyTargetNotVisible(String),

    #[error("Repost target not found: {0}")]
    RepostTargetNotFound(String),

    // Same message as RepostTargetNotFound on purpose.
    #[error("Repost target not found: {0}")]
    RepostTargetNotVisible(String),

    #[error("Invalid post fields")]
    InvalidPostFields,

    #[error("Cannot repost restricted content or restrict a repost")]
    BadRepostPrivacy,

    #[error("Invalid pagination cursor")]
    BadCursor,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Server Errors ===
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_)
            | Self::UserNotFound(_)
            | Self::PostNotFound(_)
            | Self::ReplyTargetNotFound(_)
            | Self::ReplyTargetNotVisible(_)
            | Self::RepostTargetNotFound(_)
            | Self::RepostTargetNotVisible(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidPostFields
            | Self::BadRepostPrivacy
            | Self::BadCursor
            | Self::BadRequest(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Storage(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            // The four referenced-post failures collapse into one wire code.
            Self::PostNotFound(_)
            | Self::ReplyTargetNotFound(_)
            | Self::ReplyTargetNotVisible(_)
            | Self::RepostTargetNotFound(_)
            | Self::RepostTargetNotVisible(_) => "POST_NOT_FOUND",
            Self::InvalidPostFields => "INVALID_POST_FIELDS",
            Self::BadRepostPrivacy => "BAD_REPOST_PRIVACY",
            Self::BadCursor => "BAD_CURSOR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_failures_present_as_not_found() {
        let not_found = AppError::ReplyTargetNotFound("abc".to_string());
        let not_visible = AppError::ReplyTargetNotVisible("abc".to_string());

        assert_eq!(not_found.status_code(), not_visible.status_code());
        assert_eq!(not_found.error_code(), not_visible.error_code());
        assert_eq!(not_found.to_string(), not_visible.to_string());

        let not_found = AppError::RepostTargetNotFound("abc".to_string());
        let not_visible = AppError::RepostTargetNotVisible("abc".to_string());

        assert_eq!(not_found.status_code(), not_visible.status_code());
        assert_eq!(not_found.error_code(), not_visible.error_code());
        assert_eq!(not_found.to_string(), not_visible.to_string());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidPostFields.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BadRepostPrivacy.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::BadCursor.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UserNotFound("u".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("nope".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Conflict("taken".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }
}
