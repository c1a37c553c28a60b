//! LocalX REST API
//!
//! This crate provides the Axum-based HTTP API for LocalX: user
//! registration and login, tour listings, and bookings.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::{RequireAdmin, RequireAuth};
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
