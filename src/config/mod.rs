//! 配置模块：从环境变量构建显式的运行配置。
//!
//! # Configuration
//!
//! All settings are read once into a [`HarnessConfig`] that is passed to the
//! client builders. Nothing is initialized at module load.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `GALILEO_CONSOLE_URL` | Platform API base URL | `https://api.galileo.ai` |
//! | `GALILEO_API_KEY` | Platform API key | required |
//! | `GALILEO_PROJECT` | Project name | none |
//! | `GALILEO_LOG_STREAM` | Log stream name | none |
//! | `OPENAI_API_KEY` | Chat-completion API key | none |
//! | `OPENAI_BASE_URL` | Chat-completion base URL | `https://api.openai.com/v1` |
//! | `GALILEO_HTTP_TIMEOUT_SECS` | Per-request timeout | `30` |

pub mod envfile;

use crate::{Error, ErrorContext, Result};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_API_URL: &str = "https://api.galileo.ai";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "GALILEO_CONSOLE_URL";
pub const ENV_API_KEY: &str = "GALILEO_API_KEY";
pub const ENV_PROJECT: &str = "GALILEO_PROJECT";
pub const ENV_LOG_STREAM: &str = "GALILEO_LOG_STREAM";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "GALILEO_HTTP_TIMEOUT_SECS";

/// Variables the prompt-comparison workflows need.
pub const STANDARD_VARS: [&str; 5] = [
    ENV_API_URL,
    ENV_API_KEY,
    ENV_PROJECT,
    ENV_LOG_STREAM,
    ENV_OPENAI_API_KEY,
];

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub api_url: String,
    pub api_key: String,
    pub project: Option<String>,
    pub log_stream: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub http_timeout: Duration,
}

impl HarnessConfig {
    /// Build a config from explicit values, filling the rest with defaults.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            project: None,
            log_stream: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup (used by tests and `.env` handling).
    ///
    /// Only `GALILEO_API_KEY` is mandatory here; workflow-specific variables are
    /// enforced with [`check_environment`] or the `require_*` accessors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY).ok_or_else(|| missing_vars_error(&[ENV_API_KEY]))?;
        let api_url = get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let http_timeout = match get(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    Error::configuration_with_context(
                        format!("'{}' is not a number of seconds", raw),
                        ErrorContext::new()
                            .with_field_path(ENV_HTTP_TIMEOUT_SECS)
                            .with_source("config"),
                    )
                })?;
                Duration::from_secs(secs.max(1))
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url,
            api_key,
            project: get(ENV_PROJECT),
            log_stream: get(ENV_LOG_STREAM),
            openai_api_key: get(ENV_OPENAI_API_KEY),
            openai_base_url: get(ENV_OPENAI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            http_timeout,
        })
    }

    pub fn with_project(mut self, name: impl Into<String>) -> Self {
        self.project = Some(name.into());
        self
    }

    pub fn with_log_stream(mut self, name: impl Into<String>) -> Self {
        self.log_stream = Some(name.into());
        self
    }

    pub fn with_openai(mut self, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.openai_api_key = Some(api_key.into());
        self.openai_base_url = base_url.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn require_project(&self) -> Result<&str> {
        self.project
            .as_deref()
            .ok_or_else(|| missing_vars_error(&[ENV_PROJECT]))
    }

    pub fn require_log_stream(&self) -> Result<&str> {
        self.log_stream
            .as_deref()
            .ok_or_else(|| missing_vars_error(&[ENV_LOG_STREAM]))
    }

    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| missing_vars_error(&[ENV_OPENAI_API_KEY]))
    }

    /// Log the resolved configuration without secrets.
    pub fn log_summary(&self) {
        info!(
            api_url = %self.api_url,
            project = self.project.as_deref().unwrap_or("<unset>"),
            log_stream = self.log_stream.as_deref().unwrap_or("<unset>"),
            "API configuration"
        );
    }
}

/// Fail with one error naming every required variable that is unset or empty.
pub fn check_environment(required: &[&str]) -> Result<()> {
    check_environment_with(required, |name| std::env::var(name).ok())
}

pub fn check_environment_with<F>(required: &[&str], lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| lookup(*name).map_or(true, |v| v.trim().is_empty()))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing_vars_error(&missing))
    }
}

fn missing_vars_error(missing: &[&str]) -> Error {
    Error::configuration_with_context(
        format!(
            "missing required environment variables: {}",
            missing.join(", ")
        ),
        ErrorContext::new()
            .with_field_path(missing.join(","))
            .with_details("set them in the environment or in a .env file")
            .with_source("config"),
    )
}
