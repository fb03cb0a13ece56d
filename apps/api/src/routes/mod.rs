pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::taskgen::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI task generation
        .route(
            "/api/v1/products/:product_id/generate-tasks",
            post(handlers::handle_generate_tasks),
        )
        .route(
            "/api/v1/products/:product_id/generate-tasks/preview",
            post(handlers::handle_preview_tasks),
        )
        .with_state(state)
}
