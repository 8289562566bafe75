//! 提示词运行模块：发送补全请求、刷新遥测、定位 trace 并等待指标。
//!
//! # Prompt runner
//!
//! One run is a fixed sequence, awaited step by step:
//!
//! 1. send the prompt as a system message to the chat model;
//! 2. flush buffered telemetry (best effort);
//! 3. locate the trace the call produced;
//! 4. poll for each target metric, retrying once with a longer budget.
//!
//! [`PromptRunner::run_comparison`] performs two runs with a pause between
//! them so the platform records them as separate traces.

use crate::client::GalileoClient;
use crate::llm::{ChatCompletion, ChatModel};
use crate::poll::{PollOutcome, PollStrategy};
use crate::telemetry::{noop_flusher, TelemetryFlusher};
use crate::types::{Message, MetricSet, Trace};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_METRIC: &str = "instruction_adherence";

/// How the trace of a fresh completion is found.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceLookup {
    /// Poll until the log stream has a newest trace and take it.
    Latest,
    /// Poll recent traces for one containing the start of the response.
    ByContent { snippet_chars: usize },
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub model: String,
    /// Metrics to wait for, in order.
    pub metrics: Vec<String>,
    pub metric_poll: PollStrategy,
    /// Budget multiplier for the single retry when a metric is still absent.
    pub retry_factor: f64,
    pub trace_lookup: TraceLookup,
    pub trace_poll: PollStrategy,
    /// Pause between the two runs of a comparison.
    pub delay_between_runs: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            metrics: vec![DEFAULT_METRIC.to_string()],
            metric_poll: PollStrategy::default(),
            retry_factor: 1.5,
            trace_lookup: TraceLookup::Latest,
            trace_poll: PollStrategy::fixed(Duration::from_secs(5), Duration::from_secs(60)),
            delay_between_runs: Duration::from_secs(5),
        }
    }
}

impl RunOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metric_poll(mut self, strategy: PollStrategy) -> Self {
        self.metric_poll = strategy;
        self
    }

    pub fn with_trace_lookup(mut self, lookup: TraceLookup, strategy: PollStrategy) -> Self {
        self.trace_lookup = lookup;
        self.trace_poll = strategy;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_between_runs = delay;
        self
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub completion: ChatCompletion,
    /// `None` when the trace could not be located.
    pub trace: Option<Trace>,
    pub metrics: MetricSet,
    /// Target metrics still absent after the retry.
    pub missing: Vec<String>,
}

impl RunResult {
    pub fn content(&self) -> &str {
        &self.completion.content
    }

    pub fn score(&self, metric: &str) -> Option<f64> {
        self.metrics.score(metric)
    }
}

pub struct PromptRunner {
    client: Arc<GalileoClient>,
    chat: Arc<dyn ChatModel>,
    flusher: Arc<dyn TelemetryFlusher>,
    project_id: String,
    log_stream_id: String,
    options: RunOptions,
}

impl PromptRunner {
    pub fn new(
        client: Arc<GalileoClient>,
        chat: Arc<dyn ChatModel>,
        project_id: impl Into<String>,
        log_stream_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            chat,
            flusher: noop_flusher(),
            project_id: project_id.into(),
            log_stream_id: log_stream_id.into(),
            options: RunOptions::default(),
        }
    }

    pub fn with_flusher(mut self, flusher: Arc<dyn TelemetryFlusher>) -> Self {
        self.flusher = flusher;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Send `prompt` as a single system message.
    pub async fn run_prompt(&self, prompt: &str) -> Result<ChatCompletion> {
        info!(prompt = %prompt, model = %self.options.model, "running prompt");
        let completion = self
            .chat
            .complete(&self.options.model, &[Message::system(prompt)])
            .await?;
        info!(
            latency_secs = %format!("{:.2}", completion.latency.as_secs_f64()),
            "API call completed"
        );
        Ok(completion)
    }

    /// Run `prompt` and collect the target metrics of the resulting trace.
    ///
    /// A missing trace or metric is reported in the result, not as an error.
    pub async fn run_with_metrics(&self, prompt: &str, description: Option<&str>) -> Result<RunResult> {
        if let Some(description) = description {
            info!("=== {} ===", description);
        }
        let completion = self.run_prompt(prompt).await?;

        if let Err(e) = self.flusher.flush().await {
            warn!(error = %e, "continuing without flush; metrics may be delayed");
        }

        let Some(trace) = self.locate_trace(&completion.content).await? else {
            warn!("could not find the trace for this run");
            return Ok(RunResult {
                completion,
                trace: None,
                metrics: MetricSet::new(),
                missing: self.options.metrics.clone(),
            });
        };
        info!(trace_id = %trace.id, "found trace");

        let mut metrics = MetricSet::new();
        let mut missing = Vec::new();
        for name in &self.options.metrics {
            if metrics.contains(name) {
                continue;
            }
            match self.wait_with_retry(&trace.id, name).await? {
                Some(found) => metrics.merge(found),
                None => missing.push(name.clone()),
            }
        }

        Ok(RunResult {
            completion,
            trace: Some(trace),
            metrics,
            missing,
        })
    }

    /// Run the original prompt, pause, then run the improved prompt.
    pub async fn run_comparison(&self, original: &str, improved: &str) -> Result<(RunResult, RunResult)> {
        let first = self
            .run_with_metrics(original, Some("Testing Original Prompt"))
            .await?;

        if !self.options.delay_between_runs.is_zero() {
            info!(
                delay_secs = self.options.delay_between_runs.as_secs_f64(),
                "waiting before running the next test"
            );
            tokio::time::sleep(self.options.delay_between_runs).await;
        }

        let second = self
            .run_with_metrics(improved, Some("Testing Improved Prompt"))
            .await?;
        Ok((first, second))
    }

    async fn locate_trace(&self, content: &str) -> Result<Option<Trace>> {
        let outcome = match &self.options.trace_lookup {
            TraceLookup::Latest => {
                self.client
                    .wait_for_latest_trace(
                        &self.project_id,
                        &self.log_stream_id,
                        &self.options.trace_poll,
                    )
                    .await
            }
            TraceLookup::ByContent { snippet_chars } => {
                let snippet: String = content.chars().take(*snippet_chars).collect();
                self.client
                    .wait_for_trace_with_content(
                        &self.project_id,
                        &self.log_stream_id,
                        &snippet,
                        &self.options.trace_poll,
                    )
                    .await
            }
        };
        match outcome {
            PollOutcome::Failed { error, .. } => Err(error),
            other => Ok(other.into_option()),
        }
    }

    async fn wait_with_retry(&self, trace_id: &str, metric: &str) -> Result<Option<MetricSet>> {
        let first = self
            .client
            .wait_for_metric(&self.project_id, trace_id, metric, &self.options.metric_poll)
            .await;
        let first = match first {
            PollOutcome::Failed { error, .. } => return Err(error),
            other => other.into_option(),
        };
        if first.as_ref().is_some_and(|m| m.contains(metric)) {
            return Ok(first);
        }

        warn!(metric, "metric not found on first attempt, trying again with a longer timeout");
        let longer = self.options.metric_poll.scaled(self.options.retry_factor);
        match self
            .client
            .wait_for_metric(&self.project_id, trace_id, metric, &longer)
            .await
        {
            PollOutcome::Failed { error, .. } => Err(error),
            other => Ok(other.into_option()),
        }
    }
}
