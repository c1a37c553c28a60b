//! Authentication extractors

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use localx_auth::{AuthError, Identity, extract_bearer_token};
use localx_db::UserRole;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Read the bearer token from the request's `Authorization` header
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    extract_bearer_token(header)
}

fn rejection_reason(err: &AuthError) -> &'static str {
    match err {
        AuthError::MissingAuthHeader => "missing_header",
        AuthError::InvalidAuthHeader => "invalid_header",
        AuthError::InvalidToken | AuthError::Jwt(_) => "invalid_token",
        AuthError::UserNotFound => "user_not_found",
        AuthError::Forbidden { .. } => "forbidden",
        _ => "error",
    }
}

fn reject(err: AuthError) -> ApiError {
    debug!("Rejected request: {}", err);
    metrics::counter!("localx_auth_rejections_total", "reason" => rejection_reason(&err))
        .increment(1);
    ApiError::Auth(err)
}

/// Extractor for an authenticated caller of any role
pub struct RequireAuth(pub Identity);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = bearer_token(parts).map_err(reject)?;

        let identity = app_state.guard.authenticate(token).await.map_err(reject)?;

        debug!("Authenticated user {} ({})", identity.id, identity.role);
        Ok(RequireAuth(identity))
    }
}

/// Extractor for an authenticated admin
pub struct RequireAdmin(pub Identity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = bearer_token(parts).map_err(reject)?;

        let identity = app_state
            .guard
            .require_role(token, UserRole::Admin)
            .await
            .map_err(reject)?;

        Ok(RequireAdmin(identity))
    }
}
