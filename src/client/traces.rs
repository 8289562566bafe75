//! Trace search and metric polling.

use crate::client::core::{decode, decode_list, GalileoClient};
use crate::client::endpoint::PathParams;
use crate::poll::{poll_until, PollOutcome, PollStrategy, Probe};
use crate::types::{MetricSet, Trace};
use crate::Result;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

/// Body of a trace search request.
///
/// Defaults match the platform console: the ten most recent traces of one
/// log stream.
#[derive(Debug, Clone)]
pub struct TraceQuery {
    pub log_stream_id: String,
    pub limit: u32,
    pub order_by: String,
    pub order_direction: String,
    /// Extra fields merged into the request body, overriding the above.
    pub extra: Map<String, Value>,
}

impl TraceQuery {
    pub fn new(log_stream_id: impl Into<String>) -> Self {
        Self {
            log_stream_id: log_stream_id.into(),
            limit: 10,
            order_by: "created_at".to_string(),
            order_direction: "desc".to_string(),
            extra: Map::new(),
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "limit": self.limit,
            "order_by": self.order_by,
            "order_direction": self.order_direction,
            "log_stream_id": self.log_stream_id,
        });
        if let Value::Object(obj) = &mut body {
            for (k, v) in &self.extra {
                obj.insert(k.clone(), v.clone());
            }
        }
        body
    }
}

impl GalileoClient {
    /// Search traces. Accepts `{"records": [...]}`, `{"traces": [...]}` or a bare list.
    pub async fn search_traces(&self, project_id: &str, query: &TraceQuery) -> Result<Vec<Trace>> {
        let body = self
            .transport
            .post_json(
                &format!("/projects/{}/traces/search", project_id),
                &query.to_body(),
            )
            .await?;
        decode_list(body, &["records", "traces"], "traces")
    }

    /// The most recent trace of a log stream, if any.
    pub async fn latest_trace(&self, project_id: &str, log_stream_id: &str) -> Result<Option<Trace>> {
        let traces = self
            .search_traces(project_id, &TraceQuery::new(log_stream_id).limit(1))
            .await?;
        let latest = traces.into_iter().next().filter(|t| !t.id.is_empty());
        match &latest {
            Some(t) => info!(trace_id = %t.id, "found most recent trace"),
            None => warn!(log_stream_id, "no recent traces found"),
        }
        Ok(latest)
    }

    pub async fn get_trace(&self, project_id: &str, trace_id: &str) -> Result<Trace> {
        let body = self
            .transport
            .get_json(&format!("/projects/{}/traces/{}", project_id, trace_id))
            .await?;
        decode(body, "trace")
    }

    /// Poll recent traces until one mentions `snippet`.
    pub async fn wait_for_trace_with_content(
        &self,
        project_id: &str,
        log_stream_id: &str,
        snippet: &str,
        strategy: &PollStrategy,
    ) -> PollOutcome<Trace> {
        info!(snippet = %preview(snippet), "waiting for trace with content");
        let query = TraceQuery::new(log_stream_id);
        poll_until(strategy, |attempt| {
            let query = &query;
            async move {
                debug!(attempt, "searching recent traces");
                Probe::from_result(
                    self.search_traces(project_id, query)
                        .await
                        .map(|traces| traces.into_iter().find(|t| t.mentions(snippet))),
                )
            }
        })
        .await
    }

    /// Poll until the newest trace of the log stream appears.
    pub async fn wait_for_latest_trace(
        &self,
        project_id: &str,
        log_stream_id: &str,
        strategy: &PollStrategy,
    ) -> PollOutcome<Trace> {
        poll_until(strategy, |_| async move {
            Probe::from_result(self.latest_trace(project_id, log_stream_id).await)
        })
        .await
    }

    /// Fetch whatever metrics are currently attached to a trace.
    ///
    /// Endpoints are tried in the precedence of the client's trace-metrics
    /// strategy; `None` means no endpoint has metrics for the trace yet.
    pub async fn trace_metrics(&self, project_id: &str, trace_id: &str) -> Result<Option<MetricSet>> {
        let params = PathParams::new()
            .with("project_id", project_id)
            .with("trace_id", trace_id);
        let resolved = self
            .endpoints
            .trace_metrics
            .resolve(&self.transport, &params, &[])
            .await?;
        Ok(resolved.map(|r| {
            debug!(path = %r.path, rank = r.rank, "metrics endpoint answered");
            MetricSet::from_value(&r.body)
        }))
    }

    /// Metrics of the first endpoint, in precedence order, that carries `metric`.
    ///
    /// Endpoints whose metrics lack it are passed over, so a trace record
    /// holding only other scores does not hide a metrics endpoint that has
    /// the one asked for.
    pub async fn trace_metrics_containing(
        &self,
        project_id: &str,
        trace_id: &str,
        metric: &str,
    ) -> Result<Option<MetricSet>> {
        let params = PathParams::new()
            .with("project_id", project_id)
            .with("trace_id", trace_id);
        let resolved = self
            .endpoints
            .trace_metrics
            .resolve_matching(&self.transport, &params, &[], |body| {
                MetricSet::from_value(body).contains(metric)
            })
            .await?;
        Ok(resolved.map(|r| {
            debug!(path = %r.path, rank = r.rank, metric, "metric found");
            MetricSet::from_value(&r.body)
        }))
    }

    /// Poll until `metric` is present on the trace.
    ///
    /// Every attempt checks each metrics endpoint for `metric`. On timeout
    /// this is `PollOutcome::TimedOut`, not an error.
    pub async fn wait_for_metric(
        &self,
        project_id: &str,
        trace_id: &str,
        metric: &str,
        strategy: &PollStrategy,
    ) -> PollOutcome<MetricSet> {
        info!(
            metric,
            trace_id,
            max_wait_secs = strategy.max_wait.as_secs_f64(),
            "waiting for metric"
        );
        let outcome = poll_until(strategy, |attempt| async move {
            debug!(attempt, metric, "checking metrics endpoints");
            Probe::from_result(self.trace_metrics_containing(project_id, trace_id, metric).await)
        })
        .await;

        match &outcome {
            PollOutcome::Ready { attempts, .. } => info!(metric, attempts, "metric available"),
            PollOutcome::TimedOut { elapsed, .. } => {
                warn!(metric, waited_secs = elapsed.as_secs(), "timed out waiting for metric")
            }
            PollOutcome::Failed { error, .. } => warn!(metric, error = %error, "metric polling failed"),
        }
        outcome
    }
}

fn preview(s: &str) -> String {
    let mut out: String = s.chars().take(50).collect();
    if s.chars().count() > 50 {
        out.push_str("...");
    }
    out
}
