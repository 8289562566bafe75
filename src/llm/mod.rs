//! 对话补全模块：调用兼容 OpenAI 的 chat-completion 接口。
//!
//! # Chat completions
//!
//! The prompt runner only needs "send messages, get text back", so the
//! provider sits behind the [`ChatModel`] trait. [`ChatClient`] is the HTTP
//! implementation for OpenAI-compatible `POST {base}/chat/completions`.

use crate::config::HarnessConfig;
use crate::transport::HttpTransport;
use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Text returned by one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    /// First choice's content, trimmed.
    pub content: String,
    /// Wall-clock time of the call. Display only.
    pub latency: Duration,
    pub model: String,
    pub usage: Option<Value>,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<ChatCompletion>;
}

pub struct ChatClient {
    transport: HttpTransport,
}

impl ChatClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let transport = HttpTransport::new(base_url, timeout)?.with_bearer(api_key);
        Ok(Self { transport })
    }

    /// Build from `OPENAI_API_KEY` / `OPENAI_BASE_URL` as read into the config.
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Self::new(
            &config.openai_base_url,
            config.require_openai_key()?,
            config.http_timeout,
        )
    }
}

#[async_trait]
impl ChatModel for ChatClient {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<ChatCompletion> {
        let body = json!({ "model": model, "messages": messages });
        debug!(model, messages = messages.len(), "sending chat completion");

        let started = Instant::now();
        let response = self.transport.post_json("/chat/completions", &body).await?;
        let latency = started.elapsed();

        let completion = parse_completion(&response, model, latency)?;
        info!(
            model = %completion.model,
            latency_ms = latency.as_millis() as u64,
            chars = completion.content.len(),
            "chat completion received"
        );
        Ok(completion)
    }
}

/// Extract `choices[0].message.content` from a completion body.
pub fn parse_completion(body: &Value, model: &str, latency: Duration) -> Result<ChatCompletion> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::protocol_with_context(
                "chat completion without message content",
                ErrorContext::new()
                    .with_field_path("choices[0].message.content")
                    .with_source("chat"),
            )
        })?;
    Ok(ChatCompletion {
        content: content.trim().to_string(),
        latency,
        model: body
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(model)
            .to_string(),
        usage: body.get("usage").cloned(),
    })
}
