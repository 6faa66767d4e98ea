use utoipa::OpenApi;

use crate::api::handlers::{EchoReply, HealthReply};
use crate::errors::{ErrorEnvelope, ErrorKind};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HTTP Scaffold",
        version = "0.1.0",
        description = "Server scaffold with a shared error taxonomy. Every non-2xx response carries an ErrorEnvelope whose exception_type tells the client which error to raise.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::echo,
    ),
    components(
        schemas(
            HealthReply,
            EchoReply,
            ErrorEnvelope,
            ErrorKind,
        )
    ),
    tags(
        (name = "heartbeat", description = "Liveness endpoints"),
    )
)]
pub struct ApiDoc;
