//! LocalX Database Layer
//!
//! This crate provides the record store for LocalX users, tours and
//! bookings, using SQLite via sqlx for persistence.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
