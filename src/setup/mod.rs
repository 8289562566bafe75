//! 项目初始化：创建或复用项目与日志流、启用评分器并写入 `.env`。
//!
//! # Project setup
//!
//! Idempotent: an existing project or log stream with the requested name is
//! reused, and scorers already enabled are left alone.

use crate::client::GalileoClient;
use crate::config::{envfile, ENV_API_KEY, ENV_API_URL, ENV_LOG_STREAM, ENV_PROJECT};
use crate::types::{LogStream, Project};
use crate::{Error, ErrorContext, Result};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_PROJECT: &str = "quickstart_test";
pub const DEFAULT_LOG_STREAM: &str = "dev";
pub const DEFAULT_SCORERS: &[&str] = &["instruction_adherence"];

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub project: String,
    pub log_stream: String,
    pub scorers: Vec<String>,
    /// `.env` file to update; skipped when `None`.
    pub env_file: Option<PathBuf>,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT.to_string(),
            log_stream: DEFAULT_LOG_STREAM.to_string(),
            scorers: DEFAULT_SCORERS.iter().map(|s| s.to_string()).collect(),
            env_file: Some(PathBuf::from(".env")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SetupReport {
    pub project: Project,
    pub log_stream: LogStream,
    pub scorers: Vec<String>,
    pub env_file: Option<PathBuf>,
}

/// Create or reuse the project, enable and verify scorers, create or reuse
/// the log stream, then record the names in the `.env` file.
pub async fn setup_project(client: &GalileoClient, options: &SetupOptions) -> Result<SetupReport> {
    let project = client.create_project(&options.project, None).await?;
    info!(project = %project.name, id = %project.id, "project ready");

    let scorers: Vec<&str> = options.scorers.iter().map(String::as_str).collect();
    if !scorers.is_empty() {
        client.enable_scorers(&project.id, &scorers).await?;
        let missing = client.missing_scorers(&project.id, &scorers).await?;
        if !missing.is_empty() {
            return Err(Error::configuration_with_context(
                "scorers could not be verified as enabled; check the console",
                ErrorContext::new()
                    .with_field_path(format!("projects/{}/settings", project.id))
                    .with_details(missing.join(", "))
                    .with_source("setup"),
            ));
        }
        info!(scorers = ?scorers, "scorers verified");
    }

    let log_stream = client.create_log_stream(&project.id, &options.log_stream).await?;
    info!(log_stream = %log_stream.name, id = %log_stream.id, "log stream ready");

    if let Some(path) = &options.env_file {
        let config = &client.config;
        envfile::update(
            path,
            &[
                (ENV_PROJECT, options.project.as_str()),
                (ENV_LOG_STREAM, options.log_stream.as_str()),
                (ENV_API_KEY, config.api_key.as_str()),
                (ENV_API_URL, config.api_url.as_str()),
            ],
        )?;
        info!(path = %path.display(), ".env file created/updated");
    }

    Ok(SetupReport {
        project,
        log_stream,
        scorers: options.scorers.clone(),
        env_file: options.env_file.clone(),
    })
}
