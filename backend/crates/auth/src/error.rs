//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordHashError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
///
/// Client-facing messages never say which of username or password was wrong
/// and never carry store or hashing internals.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Unknown user, inactive user or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token subject exists but is deactivated
    #[error("User is inactive")]
    AccountInactive,

    #[error("Access token required")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    /// Bad signature, bad format, unknown subject or revoked
    #[error("Invalid token")]
    TokenInvalid,

    /// Access token where a refresh token is required, or vice versa
    #[error("Wrong token type")]
    TokenKindMismatch,

    #[error("Insufficient permissions for this action")]
    Forbidden,

    /// Username or email already registered
    #[error("Username or email already exists")]
    Conflict,

    #[error("User not found")]
    UserNotFound,

    #[error("Too many requests, try again later")]
    RateLimitExceeded { retry_after_secs: u64 },

    /// Credential store failure
    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordHashError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::TokenKindMismatch => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Store(_) | AuthError::PasswordHash(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::TokenKindMismatch => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::Conflict => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::RateLimitExceeded { .. } => ErrorKind::TooManyRequests,
            AuthError::Store(_) | AuthError::PasswordHash(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Machine-readable reason code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::InvalidCredentials | AuthError::AccountInactive => "auth_error",
            AuthError::MissingToken => "unauthorized",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenInvalid => "invalid_token",
            AuthError::TokenKindMismatch => "invalid_token_kind",
            AuthError::Forbidden => "forbidden",
            AuthError::Conflict => "user_exists",
            AuthError::UserNotFound => "user_not_found",
            AuthError::RateLimitExceeded { .. } => "rate_limit_exceeded",
            AuthError::Store(_) | AuthError::PasswordHash(_) | AuthError::Internal(_) => {
                "server_error"
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let message = if self.kind().is_server_error() {
            // Never leak store or hashing details
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let err = AppError::new(self.kind(), message).with_code(self.code());
        match self {
            AuthError::TokenExpired => err.with_action("Refresh the access token"),
            AuthError::RateLimitExceeded { .. } => err.with_action("Wait before retrying"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Store(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::PasswordHash(e) => {
                tracing::error!(error = %e, "Password hashing error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RateLimitExceeded { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let retry_after = match &self {
            AuthError::RateLimitExceeded { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let mut response = self.to_app_error().into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::RateLimitExceeded {
                retry_after_secs: 1
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_status_code_agrees_with_kind() {
        let errors = [
            AuthError::Validation("x".into()),
            AuthError::InvalidCredentials,
            AuthError::AccountInactive,
            AuthError::MissingToken,
            AuthError::TokenExpired,
            AuthError::TokenInvalid,
            AuthError::TokenKindMismatch,
            AuthError::Forbidden,
            AuthError::Conflict,
            AuthError::UserNotFound,
            AuthError::RateLimitExceeded {
                retry_after_secs: 3,
            },
            AuthError::Internal("boom".into()),
        ];
        for err in errors {
            assert_eq!(err.status_code().as_u16(), err.kind().status_code());
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app_err = AuthError::Internal("secret connection string".into()).to_app_error();
        assert_eq!(app_err.code(), "server_error");
        assert!(!app_err.message().contains("secret"));
    }

    #[test]
    fn test_expired_and_invalid_are_distinct_codes() {
        assert_eq!(AuthError::TokenExpired.to_app_error().code(), "token_expired");
        assert_eq!(AuthError::TokenInvalid.to_app_error().code(), "invalid_token");
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let response = AuthError::RateLimitExceeded {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
