//! Metric records and shape normalization.
//!
//! The platform returns metrics either as a list of `{name, score, explanation}`
//! objects or as a map from metric name to `{score, explanation, ...}` (or to a
//! bare number). [`MetricSet`] hides the difference.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    /// `None` when the server sent a non-numeric score.
    pub score: Option<f64>,
    #[serde(default)]
    pub explanation: String,
}

impl Metric {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score: Some(score),
            explanation: String::new(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    fn from_detail(name: &str, detail: &Value) -> Self {
        match detail {
            Value::Object(obj) => Self {
                name: name.to_string(),
                score: obj.get("score").and_then(numeric),
                explanation: obj
                    .get("explanation")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            other => Self {
                name: name.to_string(),
                score: numeric(other),
                explanation: String::new(),
            },
        }
    }
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Ordered set of metrics for one trace, independent of wire shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Vec<Metric>")]
pub struct MetricSet {
    metrics: Vec<Metric>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a metrics payload. Unrecognized shapes yield an empty set.
    pub fn from_value(value: &Value) -> Self {
        let metrics = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| {
                    let name = item.get("name")?.as_str()?;
                    Some(Metric::from_detail(name, item))
                })
                .collect(),
            Value::Object(map) => map
                .iter()
                .map(|(name, detail)| Metric::from_detail(name, detail))
                .collect(),
            _ => Vec::new(),
        };
        Self { metrics }
    }

    pub fn push(&mut self, metric: Metric) {
        match self.metrics.iter_mut().find(|m| m.name == metric.name) {
            Some(existing) => *existing = metric,
            None => self.metrics.push(metric),
        }
    }

    /// Add every metric of `other`, replacing same-named entries.
    pub fn merge(&mut self, other: MetricSet) {
        for metric in other.metrics {
            self.push(metric);
        }
    }

    /// Whether a metric with this name is present, scored or not.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn score(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|m| m.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl From<Value> for MetricSet {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl From<MetricSet> for Vec<Metric> {
    fn from(set: MetricSet) -> Self {
        set.metrics
    }
}

impl FromIterator<Metric> for MetricSet {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        let mut set = MetricSet::new();
        for metric in iter {
            set.push(metric);
        }
        set
    }
}
