//! Endpoint resolution with declared precedence.
//!
//! Some resources have been served from different paths over time. Instead
//! of probing paths ad hoc, an [`EndpointStrategy`] lists path templates in
//! order of preference and [`EndpointStrategy::resolve`] walks them:
//!
//! - a template with a placeholder that has no value is skipped,
//! - `404`/`405`, or a body whose `field` is missing, null or empty, falls
//!   through,
//! - with [`EndpointStrategy::resolve_matching`], so does a body the caller's
//!   predicate rejects,
//! - a usable body wins,
//! - any other failure stops the walk and is returned,
//! - when every candidate falls through the result is `Ok(None)`.

use crate::transport::HttpTransport;
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    /// Path with `{name}` placeholders, e.g. `/projects/{project_id}/experiments`.
    pub path: String,
    /// Take this field of the response body instead of the whole body.
    pub field: Option<String>,
}

impl EndpointTemplate {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            field: None,
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Fill placeholders, or `None` when one has no value.
    pub fn render(&self, params: &PathParams) -> Option<String> {
        let mut out = String::with_capacity(self.path.len());
        let mut rest = self.path.as_str();
        while let Some(open) = rest.find('{') {
            let close = open + rest[open..].find('}')?;
            out.push_str(&rest[..open]);
            let value = params.get(&rest[open + 1..close])?;
            out.push_str(value);
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        Some(out)
    }
}

/// Placeholder values for [`EndpointTemplate::render`].
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.values.insert(name.to_string(), value);
        }
        self
    }

    pub fn with_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// A body obtained through a strategy, with the template that produced it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub path: String,
    pub rank: usize,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointStrategy {
    templates: Vec<EndpointTemplate>,
}

impl EndpointStrategy {
    pub fn new(templates: Vec<EndpointTemplate>) -> Self {
        Self { templates }
    }

    /// Where a trace's metrics can be read, most preferred first.
    pub fn trace_metrics() -> Self {
        Self::new(vec![
            EndpointTemplate::new("/projects/{project_id}/traces/{trace_id}").field("metrics"),
            EndpointTemplate::new("/projects/{project_id}/runs/{trace_id}/metrics"),
            EndpointTemplate::new("/projects/{project_id}/traces/{trace_id}/metrics"),
        ])
    }

    pub fn experiments() -> Self {
        Self::new(vec![
            EndpointTemplate::new("/projects/{project_id}/experiments"),
            EndpointTemplate::new("/experiments"),
            EndpointTemplate::new("/api/experiments"),
        ])
    }

    pub fn experiment_details() -> Self {
        Self::new(vec![
            EndpointTemplate::new("/projects/{project_id}/experiments/{experiment_id}"),
            EndpointTemplate::new("/experiments/{experiment_id}"),
            EndpointTemplate::new("/api/experiments/{experiment_id}"),
        ])
    }

    pub fn datasets() -> Self {
        Self::new(vec![
            EndpointTemplate::new("/projects/{project_id}/datasets"),
            EndpointTemplate::new("/datasets"),
        ])
    }

    pub fn dataset_details() -> Self {
        Self::new(vec![
            EndpointTemplate::new("/projects/{project_id}/datasets/{dataset_id}"),
            EndpointTemplate::new("/datasets/{dataset_id}"),
        ])
    }

    pub fn templates(&self) -> &[EndpointTemplate] {
        &self.templates
    }

    /// Rendered candidate paths in precedence order.
    pub fn candidates(&self, params: &PathParams) -> Vec<(usize, String, Option<&str>)> {
        self.templates
            .iter()
            .enumerate()
            .filter_map(|(rank, t)| Some((rank, t.render(params)?, t.field.as_deref())))
            .collect()
    }

    /// GET the first usable body.
    pub async fn resolve(
        &self,
        transport: &HttpTransport,
        params: &PathParams,
        query: &[(&str, &str)],
    ) -> Result<Option<Resolved>> {
        self.resolve_matching(transport, params, query, |_| true).await
    }

    /// GET the first usable body that `accept` agrees with.
    ///
    /// A rejected body falls through to the next template like a 404 does.
    pub async fn resolve_matching<P>(
        &self,
        transport: &HttpTransport,
        params: &PathParams,
        query: &[(&str, &str)],
        accept: P,
    ) -> Result<Option<Resolved>>
    where
        P: Fn(&Value) -> bool,
    {
        for (rank, path, field) in self.candidates(params) {
            match transport.get_json_with_query(&path, query).await {
                Ok(body) => {
                    let body = match field {
                        Some(f) => match body.get(f) {
                            Some(v) if !is_blank(v) => v.clone(),
                            _ => {
                                debug!(%path, field = f, "field absent, trying next endpoint");
                                continue;
                            }
                        },
                        None => body,
                    };
                    if !accept(&body) {
                        debug!(%path, "body rejected, trying next endpoint");
                        continue;
                    }
                    return Ok(Some(Resolved { path, rank, body }));
                }
                Err(e) if matches!(e.status(), Some(404) | Some(405)) => {
                    debug!(%path, error = %e, "endpoint unavailable, trying next");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }
}

/// Null, `{}` and `[]` carry nothing.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
