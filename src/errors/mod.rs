//! Error taxonomy shared by the server and the client.
//!
//! The server encodes a [`ServiceError`] into a status code plus an
//! [`ErrorEnvelope`]; the client decodes the pair back into the same error.

pub mod codes;
pub mod decode;
pub mod response;
pub mod service;

pub use codes::ErrorKind;
pub use decode::{decode, decode_error};
pub use response::{encode, encode_any, ErrorEnvelope};
pub use service::ServiceError;
