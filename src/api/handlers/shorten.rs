//! Handler for link shortening endpoint.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::HeaderMap,
};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Creates a short URL for a long URL, charging the caller's quota.
///
/// # Endpoint
///
/// `POST /api/v1`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "example.com/page",
///   "short": "my-link",   // optional
///   "expiry": 48          // optional, hours
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "url": "http://example.com/page",
///   "short": "s.example.com/my-link",
///   "expiry": 48,
///   "rate_limit": 9,
///   "rate_limit_reset": 30
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the body or URL is malformed
/// - 503 Service Unavailable if the caller's quota is exhausted (`Retry-After` set)
/// - 500 Internal Server Error if the URL points at this service or the store fails
pub async fn shorten_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let client = client_ip(&headers, addr, state.behind_proxy);

    let link = state.link_service.shorten(&client, payload.into()).await?;

    Ok(Json(link.into()))
}
