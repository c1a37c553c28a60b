//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] localx_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] localx_auth::AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Auth(e) => {
                if e.status_code().is_server_error() {
                    error!("Auth failure: {}", e);
                }
                return e.into_response();
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
            ApiError::Database(e) => match e {
                localx_db::DbError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                localx_db::DbError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg),
                other => {
                    error!("Database error: {}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
                }
            },
        };

        let body = axum::Json(json!({
            "detail": message
        }));

        (status, body).into_response()
    }
}
