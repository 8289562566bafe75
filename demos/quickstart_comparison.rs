//! Quickstart comparison example
//!
//! Runs a vague prompt and a constrained prompt about Newton's First Law,
//! waits for instruction adherence on both traces and prints the comparison.
//!
//! Configuration comes from the environment (or a `.env` file):
//! - GALILEO_API_KEY, GALILEO_CONSOLE_URL, GALILEO_PROJECT, GALILEO_LOG_STREAM
//! - OPENAI_API_KEY
//!
//! Usage:
//!   cargo run --example quickstart_comparison

use galileo_harness::config::{self, envfile};
use galileo_harness::report::{self, check_word_count};
use galileo_harness::{ChatClient, GalileoClient, HarnessConfig, PromptRunner, RunOptions};
use std::path::Path;
use std::sync::Arc;

const ORIGINAL_PROMPT: &str = "Explain the following topic succinctly: Newton's First Law";
const IMPROVED_PROMPT: &str = "Explain Newton's First Law in exactly 15 words or less";
const MAX_WORDS: usize = 15;
const METRIC: &str = "instruction_adherence";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    envfile::load(Path::new(".env"))?;
    config::check_environment(&config::STANDARD_VARS)?;

    let client = Arc::new(GalileoClient::builder(HarnessConfig::from_env()?).build().await?);
    let (project, stream) = client.resolve_configured().await?;
    let chat = Arc::new(ChatClient::from_config(&client.config)?);

    let runner = PromptRunner::new(client, chat, project.id, stream.id)
        .with_options(RunOptions::default().with_metrics([METRIC]));
    let (original, improved) = runner.run_comparison(ORIGINAL_PROMPT, IMPROVED_PROMPT).await?;

    println!("Original response:\n{}\n", original.content());
    print!("{}", report::render_metrics_table(&original.metrics));
    println!("\nImproved response:\n{}\n", improved.content());
    println!("{}", check_word_count(improved.content(), Some(MAX_WORDS)));
    print!("{}", report::render_metrics_table(&improved.metrics));

    match report::compare(&original.metrics, &improved.metrics, METRIC) {
        Some(cmp) => print!("\n{}", cmp),
        None => println!("\nCannot compare {} - one or both metrics are missing", METRIC),
    }
    Ok(())
}
