//! Identity resolution from bearer tokens

use async_trait::async_trait;
use localx_db::{Database, DbError, User, UserRole};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::TokenService;

/// Authenticated caller, resolved fresh for each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub role: UserRole,
}

impl Identity {
    /// Numeric user ID as stored
    pub fn user_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Lookup of user records by email
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
}

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        self.get_user_by_email(email).await
    }
}

/// Maps verified token subjects onto stored users
pub struct IdentityResolver<S> {
    tokens: Arc<TokenService>,
    store: S,
}

impl<S: UserStore> IdentityResolver<S> {
    pub fn new(tokens: Arc<TokenService>, store: S) -> Self {
        Self { tokens, store }
    }

    /// Resolve a bearer token to the identity of an existing user
    pub async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.tokens.verify(token).ok_or(AuthError::InvalidToken)?;

        let user = self
            .store
            .find_user_by_email(&claims.sub)
            .await?
            .ok_or_else(|| {
                debug!("Token subject has no matching user");
                AuthError::UserNotFound
            })?;

        Ok(Identity::from(&user))
    }
}
