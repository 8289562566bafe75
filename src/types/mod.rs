//! 类型模块：平台资源、指标集合与对话消息的强类型表示。
//!
//! # Types Module
//!
//! Remote resources are opaque records identified by server-assigned string
//! IDs. They are deserialized leniently: missing fields default, unknown fields
//! land in `extra`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`resources`] | Project, log stream, trace, dataset, experiment |
//! | [`metrics`] | Metric records and the shape-agnostic [`MetricSet`] |
//! | [`message`] | Chat-completion messages |

pub mod message;
pub mod metrics;
pub mod resources;

pub use message::{Message, MessageRole};
pub use metrics::{Metric, MetricSet};
pub use resources::{Dataset, Experiment, LogStream, Project, Span, Trace};
