//! Configuration loading and validation

use anyhow::{Context, Result, bail};
use chrono::Duration;
use localx_auth::{TokenConfig, jwt::parse_hmac_algorithm};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret; there is no fallback value
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    /// Admin account created at startup when no admin exists yet
    #[serde(default)]
    pub bootstrap_admin_email: Option<String>,
    #[serde(default, skip_serializing)]
    pub bootstrap_admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            algorithm: default_algorithm(),
            token_ttl_minutes: default_token_ttl_minutes(),
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> String {
    "./data/localx.db".to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    localx_auth::DEFAULT_TOKEN_TTL_MINUTES
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_env_from<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = var("LOCALX_JWT_SECRET").or_else(|| var("SECRET_KEY")) {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(algorithm) = var("LOCALX_JWT_ALGORITHM") {
            self.auth.algorithm = algorithm;
        }
        if let Some(ttl) = var("LOCALX_TOKEN_TTL_MINUTES") {
            self.auth.token_ttl_minutes = ttl
                .trim()
                .parse()
                .with_context(|| format!("LOCALX_TOKEN_TTL_MINUTES is not an integer: {}", ttl))?;
        }
        if let Some(path) = var("LOCALX_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(level) = var("LOCALX_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Reject configurations the server must not start with
    pub fn validate(&self) -> Result<()> {
        match self.auth.jwt_secret.as_deref() {
            None => bail!("JWT secret is not configured; set LOCALX_JWT_SECRET or auth.jwt_secret"),
            Some(secret) if secret.trim().is_empty() => bail!("JWT secret must not be empty"),
            Some(_) => {}
        }

        if self.auth.token_ttl_minutes <= 0 {
            bail!(
                "auth.token_ttl_minutes must be positive, got {}",
                self.auth.token_ttl_minutes
            );
        }

        parse_hmac_algorithm(&self.auth.algorithm)?;

        match (&self.auth.bootstrap_admin_email, &self.auth.bootstrap_admin_password) {
            (Some(_), None) | (None, Some(_)) => {
                bail!("bootstrap_admin_email and bootstrap_admin_password must be set together")
            }
            _ => {}
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            bail!("logging.format must be 'pretty' or 'json', got '{}'", self.logging.format);
        }

        Ok(())
    }

    /// Token service settings; call after `validate`
    pub fn token_config(&self) -> Result<TokenConfig> {
        let secret = self
            .auth
            .jwt_secret
            .clone()
            .context("JWT secret is not configured")?;

        Ok(TokenConfig {
            secret,
            algorithm: self.auth.algorithm.clone(),
            ttl: Duration::minutes(self.auth.token_ttl_minutes),
        })
    }
}
