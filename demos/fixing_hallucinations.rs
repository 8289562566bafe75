//! Fixing hallucinations example
//!
//! Compares an open-ended opinion prompt with one that asks the model to
//! separate facts from opinions, on correctness and uncertainty.
//!
//! Usage:
//!   cargo run --example fixing_hallucinations

use galileo_harness::config::{self, envfile};
use galileo_harness::report;
use galileo_harness::{
    ChatClient, GalileoClient, HarnessConfig, PollStrategy, PromptRunner, RunOptions,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const ORIGINAL_PROMPT: &str =
    "Which are better: Sharks or Tigers? Explain why. Answer succinctly, you must choose one.";

const IMPROVED_PROMPT: &str = "Which are better: Sharks or Tigers?

Important instructions:
1. Acknowledge that this is a subjective question without a factually correct answer
2. Only provide scientifically verified facts about both animals
3. Clearly distinguish between facts and opinions
4. If you must choose one as 'better', explicitly state that this is a subjective opinion
5. Answer succinctly";

const METRICS: [&str; 2] = ["correctness", "uncertainty"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    envfile::load(Path::new(".env"))?;
    config::check_environment(&config::STANDARD_VARS)?;

    let client = Arc::new(GalileoClient::builder(HarnessConfig::from_env()?).build().await?);
    let (project, stream) = client.resolve_configured().await?;
    let chat = Arc::new(ChatClient::from_config(&client.config)?);

    // correctness takes longer to compute than adherence
    let options = RunOptions::default()
        .with_metrics(METRICS)
        .with_metric_poll(PollStrategy::fixed(Duration::from_secs(10), Duration::from_secs(180)));
    let runner = PromptRunner::new(client, chat, project.id, stream.id).with_options(options);
    let (original, improved) = runner.run_comparison(ORIGINAL_PROMPT, IMPROVED_PROMPT).await?;

    for (label, run) in [("Original", &original), ("Improved", &improved)] {
        println!("\n{} response:\n{}\n", label, run.content());
        print!("{}", report::render_metrics_table(&run.metrics));
    }
    for metric in METRICS {
        match report::compare(&original.metrics, &improved.metrics, metric) {
            Some(cmp) => print!("\n{}", cmp),
            None => println!("\nCannot compare {} - one or both metrics are missing", metric),
        }
    }
    Ok(())
}
