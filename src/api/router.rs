use axum::{routing::{get, patch}, Router};
use std::sync::Arc;

use super::handlers;
use super::AppState;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health (public)
        .route("/health", get(handlers::health::health_check))
        // Menu (public)
        .route("/drinks", get(handlers::drinks::list).post(handlers::drinks::create))
        // Recipes (get:drinks-detail)
        .route("/drinks-detail", get(handlers::drinks::detail))
        .route(
            "/drinks/{id}",
            patch(handlers::drinks::update).delete(handlers::drinks::delete),
        )
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
}
