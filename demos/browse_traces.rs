//! Trace browser example
//!
//! Lists the most recent traces of the configured log stream with whatever
//! metrics the platform has attached so far.
//!
//! Usage:
//!   cargo run --example browse_traces

use galileo_harness::config::{self, envfile, ENV_API_KEY, ENV_API_URL, ENV_LOG_STREAM, ENV_PROJECT};
use galileo_harness::report::render_metrics_table;
use galileo_harness::{GalileoClient, HarnessConfig, MetricSet, TraceQuery};
use std::path::Path;

const MAX_TRACES: u32 = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    envfile::load(Path::new(".env"))?;
    config::check_environment(&[ENV_API_URL, ENV_API_KEY, ENV_PROJECT, ENV_LOG_STREAM])?;

    let client = GalileoClient::builder(HarnessConfig::from_env()?).build().await?;
    let (project, stream) = client.resolve_configured().await?;
    let traces = client
        .search_traces(&project.id, &TraceQuery::new(&stream.id).limit(MAX_TRACES))
        .await?;

    println!("{} traces in {}/{}", traces.len(), project.name, stream.name);
    for trace in &traces {
        println!("\n{}  {}", trace.id, trace.created_at.as_deref().unwrap_or("-"));
        if let Some(output) = trace.output_text() {
            println!("{}", output);
        }
        let metrics = match &trace.metrics {
            Some(raw) => MetricSet::from_value(raw),
            None => client.trace_metrics(&project.id, &trace.id).await?.unwrap_or_default(),
        };
        print!("{}", render_metrics_table(&metrics));
    }
    Ok(())
}
