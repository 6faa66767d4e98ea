//! Client base for talking to a server built on this crate.

pub mod base;
pub mod error;

pub use base::{raise_for_taxonomy, ClientOptions, ServiceClient};
pub use error::ClientError;
