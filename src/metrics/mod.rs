pub mod middleware;
pub mod registry;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::errors::ServiceError;

/// Prometheus exposition for `GET /metrics`
pub async fn metrics_handler() -> Result<Response, ServiceError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        tracing::error!("Failed to encode metrics: {}", e);
        ServiceError::Runtime(format!("Failed to encode metrics: {}", e))
    })?;

    let body = String::from_utf8(buffer).unwrap_or_default();
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    )
        .into_response())
}

// Re-export commonly used metrics for convenience
pub use registry::{
    CLIENT_CONNECTIVITY_FAILURES_TOTAL, CLIENT_ERRORS_TOTAL, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS,
};
