//! OpenAPI 文档处理：为不在白名单中的路径打上 `x-excluded` 标记。
//!
//! # OpenAPI exclusion
//!
//! Docs tooling hides operations carrying `x-excluded: true`. This module
//! rewrites an OpenAPI JSON document so that exactly the operations under
//! non-allow-listed path prefixes carry the marker. Stale markers are removed
//! first, which makes repeated runs produce the same document.

use crate::{Error, ErrorContext, Result};
use serde_json::Value;
use std::path::Path;
use tracing::info;

pub const EXCLUDED_KEY: &str = "x-excluded";

/// Paths starting with any of these prefixes stay visible.
pub const DEFAULT_INCLUDE_PREFIXES: &[&str] = &["/v2"];

/// Keys of a path item that hold operations.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSummary {
    pub paths: usize,
    pub excluded_paths: usize,
    pub excluded_operations: usize,
}

pub fn is_included<S: AsRef<str>>(path: &str, prefixes: &[S]) -> bool {
    prefixes.iter().any(|p| path.starts_with(p.as_ref()))
}

/// Mark every operation of every non-allow-listed path as excluded.
pub fn apply_exclusions<S: AsRef<str>>(doc: &mut Value, prefixes: &[S]) -> Result<ExclusionSummary> {
    let paths = doc
        .get_mut("paths")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| {
            Error::protocol_with_context(
                "OpenAPI document has no paths object",
                ErrorContext::new()
                    .with_field_path("paths")
                    .with_source("openapi"),
            )
        })?;

    let mut summary = ExclusionSummary {
        paths: paths.len(),
        ..Default::default()
    };

    for (path, item) in paths.iter_mut() {
        let Some(item) = item.as_object_mut() else {
            continue;
        };

        item.remove(EXCLUDED_KEY);
        for (_, op) in item.iter_mut() {
            if let Some(op) = op.as_object_mut() {
                op.remove(EXCLUDED_KEY);
            }
        }

        if is_included(path, prefixes) {
            continue;
        }

        let mut marked = 0;
        for method in HTTP_METHODS {
            if let Some(Value::Object(op)) = item.get_mut(method) {
                op.insert(EXCLUDED_KEY.to_string(), Value::Bool(true));
                marked += 1;
            }
        }
        summary.excluded_paths += 1;
        summary.excluded_operations += marked;
    }

    Ok(summary)
}

/// Pretty-print with 2-space indentation, keeping key order.
pub fn to_pretty_json(doc: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Rewrite an OpenAPI JSON file in place.
pub fn exclude_file<S: AsRef<str>>(path: &Path, prefixes: &[S]) -> Result<ExclusionSummary> {
    let raw = std::fs::read_to_string(path)?;
    let mut doc: Value = serde_json::from_str(&raw)?;
    let summary = apply_exclusions(&mut doc, prefixes)?;
    std::fs::write(path, to_pretty_json(&doc)?)?;
    info!(
        file = %path.display(),
        paths = summary.paths,
        excluded_paths = summary.excluded_paths,
        excluded_operations = summary.excluded_operations,
        "updated OpenAPI document"
    );
    Ok(summary)
}
