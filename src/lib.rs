//! # galileo-harness
//!
//! 面向 Galileo 可观测平台的 API 客户端、指标轮询器与文档工具集。
//!
//! API client, metric poller and documentation tooling for the Galileo
//! observability platform.
//!
//! ## Overview
//!
//! The harness drives the platform the way its documentation examples do:
//! resolve a project and log stream by name, send a prompt to a chat model,
//! wait for the platform to compute metrics on the resulting trace, and compare
//! two runs. Two small tools for the documentation site come along: an OpenAPI
//! post-processor and a page scaffolder.
//!
//! ## Core Philosophy
//!
//! - **Explicit**: one [`GalileoClient`] built from a [`HarnessConfig`]; no globals
//! - **Typed outcomes**: polling ends in a [`PollOutcome`], failures in a typed [`Error`]
//! - **Declared fallbacks**: multi-path resources resolve through an [`EndpointStrategy`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use galileo_harness::{GalileoClient, HarnessConfig, PollStrategy};
//!
//! #[tokio::main]
//! async fn main() -> galileo_harness::Result<()> {
//!     let config = HarnessConfig::from_env()?;
//!     let client = GalileoClient::builder(config).build().await?;
//!
//!     let (project, stream) = client.resolve_log_stream("my-project", "dev").await?;
//!     if let Some(trace) = client.latest_trace(&project.id, &stream.id).await? {
//!         let outcome = client
//!             .wait_for_metric(&project.id, &trace.id, "correctness", &PollStrategy::default())
//!             .await;
//!         println!("{:?}", outcome.into_option());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Auth, name resolution, traces, metrics, datasets, experiments |
//! | [`config`] | Environment configuration and `.env` files |
//! | [`poll`] | Poll strategies, probes and outcomes |
//! | [`llm`] | Chat-completion client |
//! | [`runner`] | Prompt runs with metric collection |
//! | [`report`] | Metric comparison and plain-text rendering |
//! | [`setup`] | Project, scorer and log stream provisioning |
//! | [`openapi`] | `x-excluded` marking for OpenAPI documents |
//! | [`scaffold`] | Documentation page stubs |
//! | [`telemetry`] | Flush seam for buffered traces |
//! | [`transport`] | JSON-over-HTTP transport |
//! | [`types`] | Resource, metric and message types |

pub mod client;
pub mod config;
pub mod llm;
pub mod openapi;
pub mod poll;
pub mod report;
pub mod runner;
pub mod scaffold;
pub mod setup;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{EndpointStrategy, GalileoClient, GalileoClientBuilder, TraceQuery};
pub use config::HarnessConfig;
pub use llm::{ChatClient, ChatCompletion, ChatModel};
pub use poll::{Backoff, PollOutcome, PollStrategy, Probe};
pub use report::{compare, Comparison, Verdict};
pub use runner::{PromptRunner, RunOptions, RunResult, TraceLookup};
pub use telemetry::{NoopFlusher, TelemetryFlusher};
pub use types::{
    Dataset, Experiment, LogStream, Message, MessageRole, Metric, MetricSet, Project, Trace,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
