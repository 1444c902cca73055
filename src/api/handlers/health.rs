//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::domain::repositories::KeyValueStore;
use crate::state::AppState;

/// Returns service health status with keyspace checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Both keyspaces reachable
/// - **503 Service Unavailable**: One or more keyspaces unreachable
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "links": { "status": "ok" },
///     "quotas": { "status": "ok" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let links = check_store(state.keyspaces.links.as_ref()).await;
    let quotas = check_store(state.keyspaces.quotas.as_ref()).await;

    let all_healthy = links.is_ok() && quotas.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { links, quotas },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks store connectivity via PING.
async fn check_store(store: &dyn KeyValueStore) -> CheckStatus {
    if store.ping().await {
        CheckStatus {
            status: "ok".to_string(),
            message: None,
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Store unreachable".to_string()),
        }
    }
}
