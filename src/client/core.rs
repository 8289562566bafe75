use crate::client::auth::Credentials;
use crate::client::endpoint::EndpointStrategy;
use crate::config::HarnessConfig;
use crate::poll::PollStrategy;
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Endpoint strategies used by the client, one per multi-path resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub trace_metrics: EndpointStrategy,
    pub experiments: EndpointStrategy,
    pub experiment_details: EndpointStrategy,
    pub datasets: EndpointStrategy,
    pub dataset_details: EndpointStrategy,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            trace_metrics: EndpointStrategy::trace_metrics(),
            experiments: EndpointStrategy::experiments(),
            experiment_details: EndpointStrategy::experiment_details(),
            datasets: EndpointStrategy::datasets(),
            dataset_details: EndpointStrategy::dataset_details(),
        }
    }
}

/// Client for the observability platform's REST API.
///
/// Constructed explicitly through [`crate::client::GalileoClientBuilder`] and
/// passed to every workflow; it holds no hidden global state.
pub struct GalileoClient {
    pub config: HarnessConfig,
    pub transport: Arc<HttpTransport>,
    pub(crate) credentials: Credentials,
    pub(crate) endpoints: Endpoints,
    pub(crate) poll: PollStrategy,
}

impl GalileoClient {
    pub fn builder(config: HarnessConfig) -> crate::client::GalileoClientBuilder {
        crate::client::GalileoClientBuilder::new(config)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn poll_strategy(&self) -> &PollStrategy {
        &self.poll
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

/// Decode a value into `T`, reporting where the shape went wrong.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        Error::protocol_with_context(
            format!("could not decode {}", what),
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("client"),
        )
    })
}

/// Extract a list from a body that is either a bare array or an object
/// holding the array under one of `keys`.
pub(crate) fn list_field(body: Value, keys: &[&str], what: &str) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => {
            for key in keys {
                if let Some(Value::Array(items)) = obj.remove(*key) {
                    return Ok(items);
                }
            }
            Err(Error::protocol_with_context(
                format!("unexpected response format for {}", what),
                ErrorContext::new()
                    .with_field_path(keys.join("|"))
                    .with_details("object without a list field")
                    .with_source("client"),
            ))
        }
        Value::Null => Ok(Vec::new()),
        other => Err(Error::protocol_with_context(
            format!("unexpected response format for {}", what),
            ErrorContext::new()
                .with_details(format!("got {}", json_kind(&other)))
                .with_source("client"),
        )),
    }
}

/// Decode each item of a list, as [`list_field`] locates it.
pub(crate) fn decode_list<T: DeserializeOwned>(
    body: Value,
    keys: &[&str],
    what: &str,
) -> Result<Vec<T>> {
    list_field(body, keys, what)?
        .into_iter()
        .map(|item| decode(item, what))
        .collect()
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
