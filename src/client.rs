//! Client for the observability platform's REST API.
//!
//! The public surface is [`GalileoClient`] and its builder; the operations
//! are split by resource into submodules under `src/client/`.

pub mod auth;
pub mod builder;
pub mod core;
mod datasets;
pub mod endpoint;
pub(crate) mod error_classification;
mod experiments;
mod resolve;
pub mod settings;
pub mod traces;

pub use auth::Credentials;
pub use builder::GalileoClientBuilder;
pub use core::{Endpoints, GalileoClient};
pub use endpoint::{EndpointStrategy, EndpointTemplate, PathParams, Resolved};
pub use traces::TraceQuery;
