use reqwest::Method;

use crate::errors::ServiceError;

/// Everything a client call can fail with.
///
/// `Service` is a decoded error response from the server. `Connectivity`
/// means the request never got a response at all and has nothing to do
/// with the error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("failed to make {method} request to {url}: {source}")]
    Connectivity {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    /// The decoded server error, if this is one
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}
