//! LocalX Authentication and Authorization
//!
//! This crate provides password hashing, JWT access tokens, and the
//! identity resolution and role checks that gate the LocalX API.

pub mod bearer;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod resolver;

pub use bearer::extract_bearer_token;
pub use error::AuthError;
pub use guard::AccessGuard;
pub use jwt::{Claims, DEFAULT_TOKEN_TTL_MINUTES, TokenConfig, TokenService};
pub use password::{hash_password, verify_password};
pub use resolver::{Identity, IdentityResolver, UserStore};
