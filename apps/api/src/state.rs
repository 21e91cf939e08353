use std::sync::Arc;

use crate::config::Config;
use crate::seating::SeatingStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Seating persistence. Default: `PgSeatingStore` over the connection pool.
    pub store: Arc<dyn SeatingStore>,
    pub config: Config,
}
