//! First-run admin account

use anyhow::{Context, Result};
use localx_auth::hash_password;
use localx_db::{Database, DbError, NewUser, UserRole};
use tracing::{info, warn};

use crate::config::Config;

/// Create the configured admin account unless an admin already exists
pub async fn bootstrap_admin(db: &Database, config: &Config) -> Result<()> {
    let (Some(email), Some(password)) = (
        &config.auth.bootstrap_admin_email,
        &config.auth.bootstrap_admin_password,
    ) else {
        return Ok(());
    };

    if db.has_admin().await? {
        return Ok(());
    }

    info!("Creating bootstrap admin user");
    let password_hash = hash_password(password)?;
    let result = db
        .insert_user(NewUser {
            name: "Administrator".to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            role: UserRole::Admin,
        })
        .await;

    match result {
        Ok(user) => info!("Bootstrap admin created (id {})", user.id),
        // The email belongs to a regular account; never promote it implicitly
        Err(DbError::Duplicate(_)) => warn!("Bootstrap admin email is already registered, skipping"),
        Err(e) => return Err(e).context("Failed to create bootstrap admin"),
    }

    Ok(())
}
