//! Project settings: enabling and verifying scorers.

use crate::client::core::GalileoClient;
use crate::Result;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

/// Whether `scorer` is enabled in a settings document.
///
/// Three shapes have been observed and any of them counts:
/// - `scorers_configuration.{scorer} == true`
/// - `customized_scorers_configuration[].scorer_name == "_customized_{scorer}"`
/// - `scorers_config.scorers[].name == scorer`
pub fn scorer_enabled(settings: &Value, scorer: &str) -> bool {
    if settings
        .get("scorers_configuration")
        .and_then(|c| c.get(scorer))
        .and_then(Value::as_bool)
        == Some(true)
    {
        return true;
    }

    let customized = format!("_customized_{}", scorer);
    let in_customized = settings
        .get("customized_scorers_configuration")
        .and_then(Value::as_array)
        .is_some_and(|list| {
            list.iter()
                .any(|s| s.get("scorer_name").and_then(Value::as_str) == Some(customized.as_str()))
        });
    if in_customized {
        return true;
    }

    settings
        .get("scorers_config")
        .and_then(|c| c.get("scorers"))
        .and_then(Value::as_array)
        .is_some_and(|list| {
            list.iter()
                .any(|s| s.get("name").and_then(Value::as_str) == Some(scorer))
        })
}

/// Settings payload that switches `scorers` on and keeps alert configuration.
pub fn enable_scorers_payload(current: &Value, scorers: &[&str]) -> Value {
    let flags: Map<String, Value> = scorers
        .iter()
        .map(|name| (name.to_string(), Value::Bool(true)))
        .collect();
    let mut payload = json!({ "scorers_configuration": flags });
    if let Some(alerts) = current.get("alerts_configuration") {
        payload["alerts_configuration"] = alerts.clone();
    }
    payload
}

impl GalileoClient {
    pub async fn project_settings(&self, project_id: &str) -> Result<Value> {
        self.transport
            .get_json(&format!("/projects/{}/settings", project_id))
            .await
    }

    /// Names from `scorers` that are not enabled for the project.
    pub async fn missing_scorers(&self, project_id: &str, scorers: &[&str]) -> Result<Vec<String>> {
        let settings = self.project_settings(project_id).await?;
        Ok(scorers
            .iter()
            .filter(|s| !scorer_enabled(&settings, s))
            .map(|s| s.to_string())
            .collect())
    }

    /// Enable `scorers` unless they already are. Returns the settings in effect.
    pub async fn enable_scorers(&self, project_id: &str, scorers: &[&str]) -> Result<Value> {
        let current = self.project_settings(project_id).await?;
        debug!(settings = %current, "current project settings");

        if scorers.iter().all(|s| scorer_enabled(&current, s)) {
            info!(project_id, "scorers already enabled");
            return Ok(current);
        }

        let payload = enable_scorers_payload(&current, scorers);
        let updated = self
            .transport
            .put_json(&format!("/projects/{}/settings", project_id), &payload)
            .await?;
        info!(project_id, scorers = ?scorers, "scorers enabled");
        Ok(updated)
    }

    /// Register a scorer through the `evaluate.metrics` settings block.
    pub async fn register_scorer(&self, project_id: &str, scorer: &str) -> Result<Value> {
        let payload = json!({
            "evaluate": {
                "metrics": {
                    scorer: { "enabled": true }
                }
            }
        });
        let updated = self
            .transport
            .put_json(&format!("/projects/{}/settings", project_id), &payload)
            .await
            .map_err(|e| {
                warn!(project_id, scorer, error = %e, "scorer registration failed");
                e
            })?;
        info!(project_id, scorer, "scorer registered");
        Ok(updated)
    }
}
