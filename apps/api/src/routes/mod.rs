pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::seating::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Seating API
        .route(
            "/api/v1/options/:id/seating",
            post(handlers::handle_run_seating).get(handlers::handle_get_seating),
        )
        .route("/api/v1/balance", post(handlers::handle_balance))
        .with_state(state)
}
