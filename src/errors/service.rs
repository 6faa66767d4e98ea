use super::codes::ErrorKind;

/// Domain errors shared by handlers (which return them) and clients
/// (which get them back after decoding a response).
///
/// The displayed message is exactly what travels as `detail`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    KeyLookup(String),

    #[error("{0}")]
    InvalidValue(String),

    #[error("{0}")]
    IndexOutOfRange(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Preempted(String),

    #[error("{0}")]
    StateConflict(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Runtime(String),

    #[error("{0}")]
    Validation(String),

    /// An error with no declared kind
    #[error("{0}")]
    Unknown(String),
}

impl ServiceError {
    /// Not-found error naming the missing item
    pub fn not_found(item_name: impl AsRef<str>, message: impl AsRef<str>) -> Self {
        Self::NotFound(format!(
            "{} was not found. {}",
            item_name.as_ref(),
            message.as_ref()
        ))
    }

    pub fn state_conflict(message: impl AsRef<str>) -> Self {
        Self::StateConflict(format!(
            "Got request while in invalid state. {}",
            message.as_ref()
        ))
    }

    pub fn preempted(message: impl AsRef<str>) -> Self {
        Self::Preempted(format!(
            "Task got preempted by something else. {}",
            message.as_ref()
        ))
    }

    /// Build the variant for `kind` carrying `message` verbatim
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::KeyError => Self::KeyLookup(message),
            ErrorKind::ValueError => Self::InvalidValue(message),
            ErrorKind::IndexError => Self::IndexOutOfRange(message),
            ErrorKind::PermissionError => Self::PermissionDenied(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Preempted => Self::Preempted(message),
            ErrorKind::StateConflict => Self::StateConflict(message),
            ErrorKind::Timeout => Self::Timeout(message),
            ErrorKind::RuntimeError => Self::Runtime(message),
            ErrorKind::ValidationError => Self::Validation(message),
            ErrorKind::Unknown => Self::Unknown(message),
        }
    }

    /// Declared kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyLookup(_) => ErrorKind::KeyError,
            Self::InvalidValue(_) => ErrorKind::ValueError,
            Self::IndexOutOfRange(_) => ErrorKind::IndexError,
            Self::PermissionDenied(_) => ErrorKind::PermissionError,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Preempted(_) => ErrorKind::Preempted,
            Self::StateConflict(_) => ErrorKind::StateConflict,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Runtime(_) => ErrorKind::RuntimeError,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::KeyLookup(m)
            | Self::InvalidValue(m)
            | Self::IndexOutOfRange(m)
            | Self::PermissionDenied(m)
            | Self::NotFound(m)
            | Self::Preempted(m)
            | Self::StateConflict(m)
            | Self::Timeout(m)
            | Self::Runtime(m)
            | Self::Validation(m)
            | Self::Unknown(m) => m,
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ServiceError>() {
            Ok(service_err) => service_err,
            Err(other) => Self::Unknown(other.to_string()),
        }
    }
}
