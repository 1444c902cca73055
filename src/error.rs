//! Application error type and its HTTP mapping.
//!
//! Every failure a workflow can produce is one [`AppError`] variant. Each maps
//! to a distinct status code and a machine-readable `code` in the JSON body:
//!
//! ```json
//! { "error": { "code": "rate_limited", "message": "...", "details": { ... } } }
//! ```

use std::time::Duration;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::entities::{minutes_ceil, seconds_ceil};
use crate::domain::repositories::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Error payload returned to API clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed body or URL.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The URL points back at this service.
    #[error("{message}")]
    DomainConflict { message: String, details: Value },

    /// The client used up its quota for the current window.
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after: Duration,
    },

    /// Unknown or expired short code.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Store failure or unreadable stored state.
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn domain_conflict(message: impl Into<String>, details: Value) -> Self {
        Self::DomainConflict {
            message: message.into(),
            details,
        }
    }

    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited {
            message: "Rate limit exceeded".to_string(),
            retry_after,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::DomainConflict { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into the serializable payload sent to clients.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            AppError::Validation { message, details } => ErrorInfo {
                code: "validation_error",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::DomainConflict { message, details } => ErrorInfo {
                code: "domain_conflict",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::RateLimited {
                message,
                retry_after,
            } => ErrorInfo {
                code: "rate_limited",
                message: message.clone(),
                details: json!({ "rate_limit_reset": minutes_ceil(*retry_after) }),
            },
            AppError::NotFound { message, details } => ErrorInfo {
                code: "not_found",
                message: message.clone(),
                details: details.clone(),
            },
            AppError::Internal { message, details } => ErrorInfo {
                code: "internal_error",
                message: message.clone(),
                details: details.clone(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after, .. } = &self {
            let seconds = seconds_ceil(*retry_after).max(1);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        tracing::error!("Store error: {}", e);
        AppError::internal("Cannot connect to database", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = e.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        AppError::bad_request("Validation failed", json!({ "fields": fields }))
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::bad_request("Cannot parse JSON", json!({ "reason": e.body_text() }))
    }
}
