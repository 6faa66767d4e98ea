use axum::{
    http::{HeaderValue, Method},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;

use super::handlers::{echo, health, route_not_found, AppState};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;
use crate::config::CorsConfig;
use crate::metrics;

/// Application endpoints are nested under this prefix
pub const API_PREFIX: &str = "/api";
pub const HEARTBEAT_ROUTER_PREFIX: &str = "/heartbeat";
pub const HEARTBEAT_HEALTH_EP: &str = "/heartbeat/health";
pub const HEARTBEAT_ECHO_EP: &str = "/heartbeat/echo";

/// Endpoints every server exposes so clients can check it is alive
pub fn heartbeat_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/echo", get(echo))
}

/// Build the full application.
///
/// `api` holds the application's own endpoints; handlers report failures by
/// returning `Err(ServiceError)`, which the taxonomy turns into the matching
/// status code and envelope.
pub fn create_router(state: AppState, cors: &CorsConfig, api: Router<AppState>) -> Router {
    Router::new()
        .nest(HEARTBEAT_ROUTER_PREFIX, heartbeat_router())
        .nest(API_PREFIX, api)
        .route("/metrics", get(metrics::metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(route_not_found)
        // order matters: logging -> metrics -> cors -> trace
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let any_origin = config.allowed_origins.iter().any(|o| o == "*");
    let listed: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter(|o| *o != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|method| match method.to_uppercase().parse::<Method>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(method = %method, "Ignoring invalid CORS method");
                None
            }
        })
        .collect();

    // tower-http refuses a literal wildcard together with credentials
    let origins = match (any_origin, config.allow_credentials) {
        (true, true) => AllowOrigin::mirror_request(),
        (true, false) => AllowOrigin::from(Any),
        (false, _) => AllowOrigin::list(listed),
    };

    let any_header = config.allowed_headers.iter().any(|h| h == "*");
    let headers = match (any_header, config.allow_credentials) {
        (true, true) => AllowHeaders::mirror_request(),
        (true, false) => AllowHeaders::from(Any),
        (false, _) => AllowHeaders::list(
            config
                .allowed_headers
                .iter()
                .filter_map(|h| h.parse().ok())
                .collect::<Vec<axum::http::HeaderName>>(),
        ),
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::AppStateInner;
    use crate::errors::ServiceError;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        async fn always_busy() -> Result<Json<Value>, ServiceError> {
            Err(ServiceError::state_conflict("job running"))
        }

        let api = Router::new().route("/busy", get(always_busy));
        create_router(
            Arc::new(AppStateInner::new("test-app")),
            &CorsConfig::default(),
            api,
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = get_json(test_app(), HEARTBEAT_HEALTH_EP).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_echo_endpoint() {
        let (status, body) = get_json(test_app(), "/heartbeat/echo?a=1&b=two").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["echo"]["a"], "1");
        assert_eq!(body["echo"]["b"], "two");
    }

    #[tokio::test]
    async fn test_api_error_uses_envelope() {
        let (status, body) = get_json(test_app(), "/api/busy").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["exception_type"], "state_exception");
        assert_eq!(body["detail"], "Got request while in invalid state. job running");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_envelope() {
        let (status, body) = get_json(test_app(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["exception_type"], "not_found_exception");
        assert!(body["detail"].as_str().unwrap().contains("/nope"));
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let (status, body) = get_json(test_app(), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/heartbeat/health"].is_object());
        assert!(body["components"]["schemas"]["ErrorEnvelope"].is_object());
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri(HEARTBEAT_HEALTH_EP)
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-123");
    }

    async fn allowed_origin(cors: &CorsConfig, origin: &str) -> Option<String> {
        let app = create_router(
            Arc::new(AppStateInner::new("test-app")),
            cors,
            Router::new().route("/ping", get(|| async { "pong" })),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .uri(HEARTBEAT_HEALTH_EP)
                    .header("origin", origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_allows_only_configured_origins() {
        let cors = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            ..CorsConfig::default()
        };

        assert_eq!(
            allowed_origin(&cors, "http://localhost:3000").await.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(allowed_origin(&cors, "http://evil.example").await, None);
        assert_eq!(
            allowed_origin(&CorsConfig::default(), "http://localhost:3000").await,
            None
        );
    }

    #[tokio::test]
    async fn test_cors_wildcard_with_credentials_mirrors_origin() {
        let cors = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert_eq!(
            allowed_origin(&cors, "http://anywhere.example").await.as_deref(),
            Some("http://anywhere.example")
        );

        let cors = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            ..CorsConfig::default()
        };
        assert_eq!(
            allowed_origin(&cors, "http://anywhere.example").await.as_deref(),
            Some("*")
        );
    }
}
