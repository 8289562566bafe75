//! 文档脚手架：按固定映射生成 `.mdx` 页面桩文件。
//!
//! # Docs scaffolding
//!
//! Writes one stub page per entry of [`PAGES`], relative to a base directory,
//! creating parent directories as needed. Existing files are overwritten.

use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Page path (without extension) and title.
pub const PAGES: &[(&str, &str)] = &[
    ("what-is-galileo", "What is Galileo?"),
    ("quickstart/log/interactive-app", "Log Your First Eval (interactive app)"),
    ("quickstart/log/console", "Log Your First Eval (console)"),
    ("quickstart/log/notebook", "Log Your First Eval (notebook)"),
    ("quickstart/experiment/embedded-code", "Run an Experiment (embedded code)"),
    ("quickstart/experiment/console", "Run an Experiment (console)"),
    ("quickstart/experiment/notebook", "Run an Experiment (notebook)"),
    ("quickstart/experiment/playground-ui", "Run an Experiment (playground UI)"),
    ("guides/evals/overview", "Evals Overview"),
    ("guides/evals/function-based", "Function-Based Evaluators"),
    ("guides/evals/class-based", "Class-Based Evaluators"),
    ("guides/evals/llm-judges", "LLM Judges"),
    ("guides/evals/using-evaluators-in-logging", "Using Evaluators in Logging"),
    ("guides/logs/log-an-eval", "Log an Eval"),
    ("guides/logs/log-batched-evals", "Log Batched Evals"),
    ("guides/logs/visualize-and-filter", "Visualize and Filter Logs"),
    ("guides/datasets/upload", "Upload a Dataset"),
    ("guides/datasets/using", "Using Datasets"),
    ("guides/datasets/large-datasets", "Working with Large Datasets"),
    ("guides/datasets/custom", "Generate a Custom Dataset"),
    ("guides/datasets/off-the-shelf", "Off-the-Shelf Datasets"),
    ("guides/experiments/run-python", "Run an Experiment (Python)"),
    ("guides/experiments/run-typescript", "Run an Experiment (TypeScript)"),
    ("guides/experiments/evaluators", "Using Evaluators in Experiments"),
    ("guides/experiments/tasks", "Experiment Tasks"),
    ("guides/experiments/chaining", "Chain Evaluations"),
    ("guides/experiments/configs", "Experiment Configurations"),
    ("guides/experiments/visualize", "Visualize Experiments"),
    ("guides/monitoring/logs", "Monitoring Logs"),
    ("guides/monitoring/webhooks", "Webhooks for Monitoring"),
    ("core-workflows/log", "Logging"),
    ("core-workflows/traces", "Traces"),
    ("core-workflows/spans", "Spans"),
    ("core-workflows/sessions", "Sessions"),
    ("core-workflows/experiment", "Experimentation"),
    ("core-workflows/test", "Testing"),
    ("core-workflows/dataset", "Dataset Management"),
    ("core-workflows/metrics", "Metrics"),
    ("core-workflows/prompts", "Prompts"),
    ("core-workflows/annotate", "Annotation"),
    ("core-workflows/fine-tuning", "Fine-Tuning"),
    ("cookbooks/use-case/rag", "RAG Use Case"),
    ("cookbooks/use-case/chat", "Chat Use Case"),
    ("cookbooks/use-case/agent", "Agent Use Case"),
    ("cookbooks/workflow/logging", "Logging Workflow"),
    ("cookbooks/workflow/evaluations", "Evaluations Workflow"),
    ("cookbooks/workflow/integrations", "Integrations Workflow"),
    ("sdk-api/functional-api", "Functional API"),
    ("sdk-api/references", "References"),
    ("sdk-api/examples", "Examples"),
    ("references/faqs/errors", "Common Errors"),
    ("references/faqs/troubleshooting", "Troubleshooting"),
    ("references/faqs/general", "General"),
    ("references/release-notes", "Release Notes"),
];

pub const EXTENSION: &str = "mdx";

/// Frontmatter, heading and placeholder body for a page.
pub fn render_page(title: &str) -> String {
    format!(
        "---\ntitle: {title}\n---\n\n# {title}\n\nContent goes here.\n",
        title = title
    )
}

/// Write the given pages under `base_dir`, returning the written paths.
pub fn write_pages(base_dir: &Path, pages: &[(&str, &str)]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(pages.len());
    for (rel, title) in pages {
        let full = base_dir.join(format!("{}.{}", rel, EXTENSION));
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, render_page(title))?;
        info!(path = %full.display(), "updated page");
        written.push(full);
    }
    Ok(written)
}

/// Write every page of [`PAGES`] under `base_dir`.
pub fn scaffold_docs(base_dir: &Path) -> Result<Vec<PathBuf>> {
    write_pages(base_dir, PAGES)
}
