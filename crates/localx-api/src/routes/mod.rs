//! API routes

mod bookings;
mod health;
pub mod metrics;
mod tours;
pub mod types;
mod users;

#[cfg(test)]
mod tests;

use axum::Router;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::{AppState, MetricsHandle};

/// Parse a path or body record ID; anything unparseable cannot exist
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::NotFound(not_found.to_string()))
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(tours::routes())
        .merge(bookings::routes())
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
