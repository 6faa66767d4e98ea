use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

use super::extract::ValidatedQuery;
use crate::errors::{ErrorEnvelope, ServiceError};

pub type AppState = Arc<AppStateInner>;

/// Shared state handed to every handler
pub struct AppStateInner {
    pub app_name: String,
    pub started_at: Instant,
}

impl AppStateInner {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            started_at: Instant::now(),
        }
    }
}

/// Empty liveness reply
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct HealthReply {}

/// Echo reply
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EchoReply {
    /// Query parameters exactly as received
    pub echo: HashMap<String, String>,
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/heartbeat/health",
    tag = "heartbeat",
    responses(
        (status = 200, description = "Server is alive", body = HealthReply)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthReply> {
    tracing::debug!(
        app = %state.app_name,
        uptime_seconds = state.started_at.elapsed().as_secs(),
        "Heartbeat"
    );
    Json(HealthReply::default())
}

/// Echo query parameters back to the caller
#[utoipa::path(
    get,
    path = "/heartbeat/echo",
    tag = "heartbeat",
    responses(
        (status = 200, description = "Parameters echoed", body = EchoReply),
        (status = 422, description = "Unparseable query string", body = ErrorEnvelope)
    )
)]
pub async fn echo(ValidatedQuery(args): ValidatedQuery<HashMap<String, String>>) -> Json<EchoReply> {
    Json(EchoReply { echo: args })
}

/// Fallback for routes nobody registered
pub async fn route_not_found(uri: axum::http::Uri) -> ServiceError {
    ServiceError::not_found(uri.path(), "No such route.")
}
