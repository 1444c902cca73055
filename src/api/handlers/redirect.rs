//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look up the code in the links keyspace
/// 2. Increment the global usage counter
/// 3. Return 301 Moved Permanently
///
/// The redirect is only sent once the counter update succeeded.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown or expired.
/// Returns 500 Internal Server Error if the store fails.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let long_url = state.link_service.resolve(&code).await?;

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, long_url)]).into_response())
}
