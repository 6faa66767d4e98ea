use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::codes::ErrorKind;
use super::service::ServiceError;

/// JSON body sent with every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Human-readable error message
    pub detail: String,
    /// Error category for programmatic handling
    pub exception_type: ErrorKind,
}

impl ErrorEnvelope {
    pub fn new(exception_type: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            exception_type,
        }
    }
}

/// Encode a domain error into its status and envelope
pub fn encode(err: &ServiceError) -> (StatusCode, ErrorEnvelope) {
    let kind = err.kind();
    let status =
        StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, ErrorEnvelope::new(kind, err.to_string()))
}

/// Encode any error. Errors that are not a `ServiceError` have no declared
/// kind and become 500 / `unknown`.
pub fn encode_any(err: &(dyn std::error::Error + 'static)) -> (StatusCode, ErrorEnvelope) {
    match err.downcast_ref::<ServiceError>() {
        Some(service_err) => encode(service_err),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorEnvelope::new(ErrorKind::Unknown, err.to_string()),
        ),
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, envelope) = encode(&self);
        (status, Json(envelope)).into_response()
    }
}
