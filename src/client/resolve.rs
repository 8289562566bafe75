//! Name-to-ID resolution for projects and log streams, plus create-or-reuse.

use crate::client::core::{decode, decode_list, GalileoClient};
use crate::types::{LogStream, Project};
use crate::{Error, Result};
use serde_json::json;
use tracing::{info, warn};

/// Body fragment the platform returns when a project name is taken.
const PROJECT_EXISTS_MARKER: &str = "already exists";

impl GalileoClient {
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let body = self.transport.get_json("/projects").await?;
        let projects: Vec<Project> = decode_list(body, &["projects"], "projects")?;
        info!(count = projects.len(), "fetched projects");
        Ok(projects)
    }

    /// Linear scan of all projects for an exact name match.
    pub async fn find_project(&self, name: &str) -> Result<Project> {
        self.list_projects()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::not_found("Project", name))
    }

    pub async fn list_log_streams(&self, project_id: &str) -> Result<Vec<LogStream>> {
        let body = self
            .transport
            .get_json(&format!("/projects/{}/log_streams", project_id))
            .await?;
        let streams: Vec<LogStream> = decode_list(body, &["log_streams"], "log streams")?;
        info!(project_id, count = streams.len(), "fetched log streams");
        Ok(streams)
    }

    pub async fn find_log_stream(&self, project_id: &str, name: &str) -> Result<LogStream> {
        let mut stream = self
            .list_log_streams(project_id)
            .await?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::not_found("Log stream", name))?;
        stream.project_id.get_or_insert_with(|| project_id.to_string());
        Ok(stream)
    }

    /// Resolve a project and one of its log streams by name.
    pub async fn resolve_log_stream(
        &self,
        project_name: &str,
        log_stream_name: &str,
    ) -> Result<(Project, LogStream)> {
        let project = self.find_project(project_name).await?;
        info!(project = %project.name, id = %project.id, "found project");
        let stream = self.find_log_stream(&project.id, log_stream_name).await?;
        info!(log_stream = %stream.name, id = %stream.id, "found log stream");
        Ok((project, stream))
    }

    /// Resolve the project and log stream named in the client configuration.
    pub async fn resolve_configured(&self) -> Result<(Project, LogStream)> {
        let project = self.config.require_project()?.to_string();
        let stream = self.config.require_log_stream()?.to_string();
        self.resolve_log_stream(&project, &stream).await
    }

    /// Create a `gen_ai` project, or return the existing one with that name.
    pub async fn create_project(&self, name: &str, description: Option<&str>) -> Result<Project> {
        let description = description
            .map(str::to_string)
            .unwrap_or_else(|| format!("Project created for {}", name));
        let payload = json!({
            "name": name,
            "description": description,
            "type": "gen_ai",
        });

        match self.transport.post_json("/projects", &payload).await {
            Ok(body) => {
                let project: Project = decode(body, "project")?;
                info!(project = name, id = %project.id, "project created");
                Ok(project)
            }
            Err(Error::Remote {
                status: 422,
                ref message,
                ..
            }) if message.contains(PROJECT_EXISTS_MARKER) => {
                warn!(project = name, "project already exists, reusing it");
                self.find_project(name).await
            }
            Err(e) => Err(e),
        }
    }

    /// Return the log stream with this name, creating it when absent.
    pub async fn create_log_stream(&self, project_id: &str, name: &str) -> Result<LogStream> {
        match self.find_log_stream(project_id, name).await {
            Ok(existing) => {
                warn!(log_stream = name, id = %existing.id, "log stream already exists");
                return Ok(existing);
            }
            Err(Error::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let payload = json!({
            "name": name,
            "description": format!("Log stream created for {}", name),
        });
        let body = self
            .transport
            .post_json(&format!("/projects/{}/log_streams", project_id), &payload)
            .await?;
        let mut stream: LogStream = decode(body, "log stream")?;
        stream.project_id.get_or_insert_with(|| project_id.to_string());
        info!(log_stream = name, id = %stream.id, "log stream created");
        Ok(stream)
    }
}
