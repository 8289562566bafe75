//! Minimal `.env` handling: load `KEY=VALUE` lines and update them in place.

use crate::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
///
/// Values may be wrapped in single or double quotes; the quotes are stripped.
pub fn parse(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Export variables from a `.env` file that are not already set.
///
/// A missing file is not an error. Returns the number of variables exported.
pub fn load(path: &Path) -> Result<usize> {
    if !path.exists() {
        debug!(path = %path.display(), "no .env file");
        return Ok(0);
    }
    let content = fs::read_to_string(path)?;
    let mut exported = 0;
    for (key, value) in parse(&content) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            exported += 1;
        }
    }
    debug!(path = %path.display(), exported, "loaded .env file");
    Ok(exported)
}

/// Overwrite `updates` in the `.env` file at `path`, keeping other entries.
///
/// Existing keys keep their position; new keys are appended in the given order.
/// Comments and blank lines are not preserved.
pub fn update(path: &Path, updates: &[(&str, &str)]) -> Result<()> {
    let mut entries = if path.exists() {
        parse(&fs::read_to_string(path)?)
    } else {
        Vec::new()
    };

    for (key, value) in updates {
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body: String = entries
        .iter()
        .map(|(k, v)| format!("{}={}\n", k, v))
        .collect();
    fs::write(path, body)?;
    info!(path = %path.display(), keys = updates.len(), ".env file updated");
    Ok(())
}
