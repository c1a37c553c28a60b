//! Application state

use localx_auth::{AccessGuard, IdentityResolver, TokenService};
use localx_db::Database;
use std::sync::Arc;

/// Prometheus render handle installed by the binary
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenService>,
    pub guard: Arc<AccessGuard<Database>>,
}

impl AppState {
    pub fn new(db: Database, tokens: Arc<TokenService>) -> Self {
        let guard = Arc::new(AccessGuard::new(IdentityResolver::new(
            tokens.clone(),
            db.clone(),
        )));

        Self { db, tokens, guard }
    }
}
