//! Experiment listing and lookup.

use crate::client::core::{decode, decode_list, GalileoClient};
use crate::client::endpoint::PathParams;
use crate::types::Experiment;
use crate::{Error, Result};
use tracing::info;

impl GalileoClient {
    /// List a project's experiments.
    ///
    /// Project-less fallback endpoints receive the project as a `project_id`
    /// query parameter.
    pub async fn list_experiments(&self, project_id: &str) -> Result<Vec<Experiment>> {
        let params = PathParams::new().with("project_id", project_id);
        let resolved = self
            .endpoints
            .experiments
            .resolve(&self.transport, &params, &[("project_id", project_id)])
            .await?
            .ok_or_else(|| Error::not_found("Experiment endpoint", project_id))?;
        let experiments: Vec<Experiment> =
            decode_list(resolved.body, &["experiments"], "experiments")?;
        info!(count = experiments.len(), path = %resolved.path, "fetched experiments");
        Ok(experiments)
    }

    pub async fn get_experiment(&self, project_id: &str, experiment_id: &str) -> Result<Experiment> {
        let params = PathParams::new()
            .with("project_id", project_id)
            .with("experiment_id", experiment_id);
        let resolved = self
            .endpoints
            .experiment_details
            .resolve(&self.transport, &params, &[("project_id", project_id)])
            .await?
            .ok_or_else(|| Error::not_found("Experiment", experiment_id))?;
        decode(resolved.body, "experiment")
    }

    /// First experiment whose name contains `name`, ignoring case.
    pub async fn find_experiment_by_name(&self, project_id: &str, name: &str) -> Result<Experiment> {
        let needle = name.to_lowercase();
        self.list_experiments(project_id)
            .await?
            .into_iter()
            .find(|e| e.name.to_lowercase().contains(&needle))
            .ok_or_else(|| Error::not_found("Experiment", name))
    }
}
