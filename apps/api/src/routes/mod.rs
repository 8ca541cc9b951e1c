pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::mcp::server;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/mcp", post(server::handle_mcp))
        .with_state(state)
}
