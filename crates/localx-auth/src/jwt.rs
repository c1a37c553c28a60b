//! JWT access token management

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::AuthError;

/// Default access token lifetime
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    /// Algorithm identifier, one of `HS256`, `HS384`, `HS512`
    pub algorithm: String,
    pub ttl: Duration,
}

impl TokenConfig {
    /// HS256 with the default lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: "HS256".to_string(),
            ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }
}

/// Parse an algorithm identifier, accepting only the HMAC family
pub fn parse_hmac_algorithm(name: &str) -> Result<Algorithm, AuthError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| AuthError::Config(format!("Unknown JWT algorithm: {}", name)))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(AuthError::Config(format!(
            "JWT algorithm {} is not a symmetric HMAC algorithm",
            name
        ))),
    }
}

/// Issues and verifies signed access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from explicit configuration
    pub fn new(config: TokenConfig) -> Result<Self, AuthError> {
        if config.secret.is_empty() {
            return Err(AuthError::Config("JWT secret must not be empty".to_string()));
        }
        let algorithm = parse_hmac_algorithm(&config.algorithm)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            ttl: config.ttl,
        })
    }

    /// Configured token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` with the configured lifetime
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_with_ttl(subject, self.ttl)
    }

    /// Issue a token for `subject` expiring `ttl` from now.
    ///
    /// A zero or negative `ttl` yields a token that never verifies.
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        debug!("Issuing token expiring at {}", claims.exp);

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Verify a token and return its claims.
    ///
    /// `None` for anything that is not a well-formed token signed with this
    /// service's key and algorithm whose expiry is still in the future.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!("Token rejected: {}", e);
                return None;
            }
        };

        // jsonwebtoken accepts exp == now
        if claims.exp <= Utc::now().timestamp() {
            debug!("Token rejected: expired");
            return None;
        }

        Some(claims)
    }
}
