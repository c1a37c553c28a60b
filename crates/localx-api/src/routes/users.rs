//! Registration, login and profile routes

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};
use localx_auth::{AuthError, hash_password, password::DUMMY_HASH, verify_password};
use localx_db::{DbError, NewUser, UserRole};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::RequireAuth;
use crate::state::AppState;

use super::types::{LoginForm, MeResponse, RegisterRequest, RegisterResponse, TokenResponse};

// ==================== Input Validation ====================

/// Maximum allowed email length
const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum allowed name length
const MAX_NAME_LENGTH: usize = 100;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;

const USER_EXISTS: &str = "User already exists";

/// Canonical form used for storage and lookup
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email shape and length
fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate password length
fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Login Extractor ====================

/// Login credentials from either an OAuth2 password form or a JSON body
pub struct LoginCredentials(pub LoginForm);

impl<S> FromRequest<S> for LoginCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let form = if is_json {
            Json::<LoginForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?
                .0
        } else {
            Form::<LoginForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?
                .0
        };

        Ok(LoginCredentials(form))
    }
}

// ==================== User Routes ====================

/// POST /users/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = normalize_email(&request.email);
    validate_email(&email)?;
    validate_name(&request.name)?;
    validate_password(&request.password)?;

    debug!("Registering user: {}", email);

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::BadRequest(USER_EXISTS.to_string()));
    }

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            name: request.name.trim().to_string(),
            email,
            password_hash,
            role: UserRole::User,
        })
        .await
        .map_err(registration_error)?;

    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.to_string(),
            email: user.email,
            message: "User registered".to_string(),
        }),
    ))
}

/// A registration that loses an insert race reports the same message as the pre-check
fn registration_error(err: DbError) -> ApiError {
    match err {
        DbError::Duplicate(_) => ApiError::BadRequest(USER_EXISTS.to_string()),
        other => other.into(),
    }
}

/// POST /users/login
async fn login(
    State(state): State<AppState>,
    LoginCredentials(form): LoginCredentials,
) -> Result<Json<TokenResponse>, ApiError> {
    if form.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::Auth(AuthError::InvalidCredentials));
    }

    let email = normalize_email(&form.username);
    let user = state.db.get_user_by_email(&email).await?;

    // Always run a verification so an unknown email costs the same as a wrong password
    let hash = user.as_ref().map_or(DUMMY_HASH, |u| u.password_hash.as_str());
    let password_valid = verify_password(&form.password, hash);

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => {
            metrics::counter!("localx_logins_total", "outcome" => "failure").increment(1);
            debug!("Failed login attempt");
            return Err(ApiError::Auth(AuthError::InvalidCredentials));
        }
    };

    let access_token = state.tokens.issue(&user.email)?;

    metrics::counter!("localx_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in", user.id);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.ttl().num_seconds(),
    }))
}

/// GET /users/me
async fn me(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_email(&identity.email)
        .await?
        .ok_or(ApiError::Auth(AuthError::UserNotFound))?;

    Ok(Json(MeResponse {
        id: identity.id,
        email: identity.email,
        name: user.name,
        role: identity.role.as_str().to_string(),
    }))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/me", get(me))
}
