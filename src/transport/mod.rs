//! HTTP transport to the TTS service.

mod http;

pub use http::{HttpTransport, TransportError};
