pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::sheets::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Templates
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        .route(
            "/api/v1/templates/:kind/blank-partial",
            get(handlers::handle_blank_partial),
        )
        // Sheets
        .route("/api/v1/sheets/pack", post(handlers::handle_pack))
        .route("/api/v1/sheets/export", post(handlers::handle_export))
        .with_state(state)
}
