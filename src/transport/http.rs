use crate::client::error_classification::classify_status;
use crate::{Error, ErrorContext, Result};
use reqwest::{Method, Proxy};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body kept in `Error::Remote` messages.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// JSON-over-HTTP transport bound to one base URL.
///
/// Every request carries `Content-Type: application/json` and, when a
/// credential is set, `Authorization: Bearer <credential>`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL '{}'", base_url),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("http_transport"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported URL scheme '{}'", parsed.scheme()),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("http_transport"),
            ));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("GALILEO_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Attach the bearer credential sent with every request.
    pub fn with_bearer(mut self, credential: impl Into<String>) -> Self {
        self.bearer = Some(credential.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        self.execute(Method::GET, path, None, &[]).await
    }

    pub async fn get_json_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.execute(Method::GET, path, None, query).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(Method::POST, path, Some(body), &[]).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(Method::PUT, path, Some(body), &[]).await
    }

    /// POST and keep the exact success status alongside the body.
    pub async fn post_json_with_status(&self, path: &str, body: &Value) -> Result<(u16, Value)> {
        self.execute_with_status(Method::POST, path, Some(body), &[]).await
    }

    /// Send one request and decode the JSON body.
    ///
    /// Non-2xx responses become `Error::Remote` classified by status family.
    /// An empty 2xx body decodes to `Value::Null`.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<Value> {
        self.execute_with_status(method, path, body, query)
            .await
            .map(|(_, value)| value)
    }

    pub async fn execute_with_status(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<(u16, Value)> {
        let url = self.url(path);
        debug!(%method, %url, "sending request");

        let mut request = self
            .client
            .request(method, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(credential) = &self.bearer {
            request = request.bearer_auth(credential);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        if !(200..300).contains(&status) {
            let (class, retryable) = classify_status(status);
            return Err(Error::Remote {
                status,
                class: class.to_string(),
                message: truncate_body(&text),
                retryable,
            });
        }

        if text.trim().is_empty() {
            return Ok((status, Value::Null));
        }

        let value = serde_json::from_str(&text).map_err(|e| {
            Error::protocol_with_context(
                "response body is not valid JSON",
                ErrorContext::new()
                    .with_field_path(url)
                    .with_details(e.to_string())
                    .with_source("http_transport"),
            )
        })?;
        Ok((status, value))
    }
}

fn truncate_body(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", head)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
