//! Router builder utilities for catalog routes

use super::handlers::{AppState, get_page, health_check, post_page, validate};
use axum::{
    Router,
    routing::{get, post},
};

/// Build health check routes
pub fn build_health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Build catalog routes
///
/// - GET /products/page - Page with query-string parameters
/// - POST /products/page - Page with a JSON request body
/// - POST /products/validate - Validate a product payload
pub fn build_catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/products/page", get(get_page).post(post_page))
        .route("/products/validate", post(validate))
        .with_state(state)
}
