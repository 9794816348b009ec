//! HTTP plumbing for the Nature Remo cloud API.

pub mod http;

pub use http::{HttpTransport, TransportError};
