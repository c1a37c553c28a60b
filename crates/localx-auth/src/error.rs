//! Authentication error types

use axum::http::StatusCode;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::{IntoResponse, Response};
use localx_db::{DbError, UserRole};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Access denied: requires {required} role, has {actual}")]
    Forbidden { required: UserRole, actual: UserRole },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Invalid auth configuration: {0}")]
    Config(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("User store error: {0}")]
    Store(#[from] DbError),
}

impl AuthError {
    /// Missing, malformed or unverifiable credentials on a request
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeader
                | AuthError::InvalidToken
                | AuthError::UserNotFound
                | AuthError::Jwt(_)
        )
    }

    /// Authenticated, but lacking the required role
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::Forbidden { .. })
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::PasswordHash(_) | AuthError::Config(_) | AuthError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-facing message; internal failures are not described
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Forbidden { .. } => "Access denied".to_string(),
            AuthError::Jwt(_) => "Invalid token".to_string(),
            AuthError::PasswordHash(_) | AuthError::Config(_) | AuthError::Store(_) => {
                "Internal error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = axum::Json(json!({
            "detail": self.public_message()
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
