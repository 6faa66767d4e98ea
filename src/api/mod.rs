//! Server scaffold: router, heartbeat endpoints, extractors and the
//! background server handle.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;

pub use routes::{create_router, API_PREFIX, HEARTBEAT_ECHO_EP, HEARTBEAT_HEALTH_EP};
pub use server::{ServerError, ServerHandle};
