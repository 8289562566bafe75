//! Dataset listing and lookup.

use crate::client::core::{decode, decode_list, list_field, GalileoClient};
use crate::client::endpoint::PathParams;
use crate::types::Dataset;
use crate::{Error, Result};
use tracing::{debug, info};

impl GalileoClient {
    /// List datasets, scoped to a project when one is given.
    pub async fn list_datasets(&self, project_id: Option<&str>) -> Result<Vec<Dataset>> {
        let params = PathParams::new().with_opt("project_id", project_id);
        let Some(resolved) = self
            .endpoints
            .datasets
            .resolve(&self.transport, &params, &[])
            .await?
        else {
            return Err(Error::not_found("Dataset endpoint", project_id.unwrap_or("-")));
        };
        let datasets: Vec<Dataset> = decode_list(resolved.body, &["datasets"], "datasets")?;
        info!(count = datasets.len(), path = %resolved.path, "fetched datasets");
        Ok(datasets)
    }

    /// Fetch a dataset with its entries.
    ///
    /// When the detail body carries no entries they are read from the
    /// `/entries` sub-resource of the endpoint that answered.
    pub async fn get_dataset(&self, project_id: Option<&str>, dataset_id: &str) -> Result<Dataset> {
        let params = PathParams::new()
            .with_opt("project_id", project_id)
            .with("dataset_id", dataset_id);
        let resolved = self
            .endpoints
            .dataset_details
            .resolve(&self.transport, &params, &[])
            .await?
            .ok_or_else(|| Error::not_found("Dataset", dataset_id))?;

        let has_entries = resolved.body.get("entries").is_some_and(|e| e.is_array());
        let mut dataset: Dataset = decode(resolved.body, "dataset")?;
        if dataset.id.is_empty() {
            dataset.id = dataset_id.to_string();
        }
        if !has_entries {
            let entries_path = format!("{}/entries", resolved.path);
            debug!(path = %entries_path, "fetching dataset entries");
            let body = self.transport.get_json(&entries_path).await?;
            dataset.entries = list_field(body, &["entries"], "dataset entries")?;
        }
        Ok(dataset)
    }

    pub async fn find_dataset_by_name(
        &self,
        project_id: Option<&str>,
        name: &str,
    ) -> Result<Dataset> {
        let found = self
            .list_datasets(project_id)
            .await?
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| Error::not_found("Dataset", name))?;
        self.get_dataset(project_id, &found.id).await
    }
}
