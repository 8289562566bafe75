//! HTTP transport shared by the platform client and the chat-completion client.

pub mod http;

pub use http::{HttpTransport, TransportError};
