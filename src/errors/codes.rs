use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::openapi::{ObjectBuilder, RefOr, Schema, SchemaType};
use utoipa::ToSchema;

/// Wire-stable error categories carried in the `exception_type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing key in a lookup
    KeyError,

    /// Well-typed but unacceptable value
    ValueError,

    /// Index out of range
    IndexError,

    /// Caller is not allowed to perform the operation
    PermissionError,

    /// Requested item does not exist
    NotFound,

    /// A newer request cancelled this one
    Preempted,

    /// Request is valid but incompatible with current server state
    StateConflict,

    /// Operation did not finish in time
    Timeout,

    /// Generic server-side failure
    RuntimeError,

    /// Request body or parameters failed validation
    ValidationError,

    /// Anything not otherwise classified
    Unknown,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 11] = [
        Self::KeyError,
        Self::ValueError,
        Self::IndexError,
        Self::PermissionError,
        Self::NotFound,
        Self::Preempted,
        Self::StateConflict,
        Self::Timeout,
        Self::RuntimeError,
        Self::ValidationError,
        Self::Unknown,
    ];

    /// String emitted in `exception_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyError => "key_error",
            Self::ValueError => "value_error",
            Self::IndexError => "index_error",
            Self::PermissionError => "permission_error",
            Self::NotFound => "not_found_exception",
            Self::Preempted => "preempted_exception",
            Self::StateConflict => "state_exception",
            Self::Timeout => "timeout_error",
            Self::RuntimeError => "runtime_error",
            Self::ValidationError => "request_validation_error",
            Self::Unknown => "unknown_error",
        }
    }

    /// Parse an `exception_type` string. Never fails: anything
    /// unrecognized is `Unknown`.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "key_error" => Self::KeyError,
            "value_error" => Self::ValueError,
            "index_error" => Self::IndexError,
            "permission_error" => Self::PermissionError,
            "not_found_exception" | "not_found" => Self::NotFound,
            "preempted_exception" | "preempted" => Self::Preempted,
            "state_exception" | "state_conflict" => Self::StateConflict,
            "timeout_error" | "timeout" => Self::Timeout,
            "runtime_error" => Self::RuntimeError,
            "request_validation_error" | "validation_error" => Self::ValidationError,
            _ => Self::Unknown,
        }
    }

    /// HTTP status the server answers with for this kind
    pub fn status_code(&self) -> u16 {
        match self {
            Self::KeyError | Self::ValueError | Self::IndexError | Self::ValidationError => 422,
            Self::NotFound => 404,
            Self::PermissionError => 403,
            Self::StateConflict | Self::Preempted => 409,
            Self::Timeout => 504,
            Self::RuntimeError | Self::Unknown => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_wire(s))
    }
}

impl<'s> ToSchema<'s> for ErrorKind {
    fn schema() -> (&'s str, RefOr<Schema>) {
        let schema = ObjectBuilder::new()
            .schema_type(SchemaType::String)
            .enum_values(Some(Self::ALL.iter().map(|kind| kind.as_str())))
            .build();
        ("ErrorKind", RefOr::T(Schema::Object(schema)))
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&s))
    }
}
