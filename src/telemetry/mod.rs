//! 遥测刷新模块：在查询 trace 之前把本地缓冲的遥测数据推送到平台。
//!
//! Telemetry flush seam.
//!
//! Traces are ingested by the platform only after the logging SDK in the
//! calling process flushes its buffer. The prompt runner triggers that flush
//! through [`TelemetryFlusher`] and treats failures as best-effort.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TelemetryFlusher`] | Trait for flush destinations |
//! | [`NoopFlusher`] | Default flusher that does nothing |
//! | [`LoggingFlusher`] | Logs each flush request; nothing is buffered in-process |
//! | [`RecordingFlusher`] | Counts flushes, for tests |

use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait TelemetryFlusher: Send + Sync {
    /// Push any buffered traces to the platform.
    async fn flush(&self) -> Result<()>;
}

/// Flusher used when nothing buffers telemetry in-process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFlusher;

#[async_trait]
impl TelemetryFlusher for NoopFlusher {
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

pub fn noop_flusher() -> Arc<dyn TelemetryFlusher> {
    Arc::new(NoopFlusher)
}

/// Logs each flush request and sends nothing.
///
/// The harness itself buffers no telemetry: completions go straight to the
/// chat endpoint and the platform ingests the trace on its side. A flush
/// therefore has nothing to push, and this flusher only leaves a marker in
/// the log showing where a run would have flushed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFlusher;

#[async_trait]
impl TelemetryFlusher for LoggingFlusher {
    async fn flush(&self) -> Result<()> {
        info!("telemetry flush requested");
        Ok(())
    }
}

/// Records how many times it was flushed.
#[derive(Debug, Default)]
pub struct RecordingFlusher {
    count: AtomicUsize,
}

impl RecordingFlusher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetryFlusher for RecordingFlusher {
    async fn flush(&self) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl<T: TelemetryFlusher + ?Sized> TelemetryFlusher for Arc<T> {
    async fn flush(&self) -> Result<()> {
        (**self).flush().await
    }
}
