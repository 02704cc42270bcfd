pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::fulfilment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/cover-letters", post(handlers::handle_generate))
        .route(
            "/api/v1/cover-letters/enqueue",
            post(handlers::handle_enqueue),
        )
        .with_state(state)
}
