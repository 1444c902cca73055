//! API route configuration.

use crate::api::handlers::shorten_handler;
use crate::state::AppState;
use axum::{Router, routing::post};

/// All API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST /v1` - Create a short URL (quota-limited per client IP)
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/v1", post(shorten_handler))
}
