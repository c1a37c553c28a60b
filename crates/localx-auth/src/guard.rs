//! Role-gated access on top of identity resolution

use localx_db::UserRole;
use tracing::debug;

use crate::error::AuthError;
use crate::resolver::{Identity, IdentityResolver, UserStore};

/// Resolves callers and enforces role requirements
pub struct AccessGuard<S> {
    resolver: IdentityResolver<S>,
}

impl<S: UserStore> AccessGuard<S> {
    pub fn new(resolver: IdentityResolver<S>) -> Self {
        Self { resolver }
    }

    /// Resolve the caller without any role requirement
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        self.resolver.resolve(token).await
    }

    /// Resolve the caller and require an exact role match
    pub async fn require_role(&self, token: &str, role: UserRole) -> Result<Identity, AuthError> {
        let identity = self.resolver.resolve(token).await?;

        if identity.role != role {
            debug!(
                "Denied user {}: requires {}, has {}",
                identity.id, role, identity.role
            );
            return Err(AuthError::Forbidden {
                required: role,
                actual: identity.role,
            });
        }

        Ok(identity)
    }
}
