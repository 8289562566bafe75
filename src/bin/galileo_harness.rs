//! galileo-harness CLI: 平台 API 工作流与文档工具的命令行入口
//!
//! Every workflow of the library as a subcommand. `.env` in the working
//! directory is loaded first; variables already set in the process win.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use galileo_harness::client::GalileoClient;
use galileo_harness::config::{self, envfile, HarnessConfig};
use galileo_harness::llm::ChatClient;
use galileo_harness::poll::PollStrategy;
use galileo_harness::report::{self, check_word_count};
use galileo_harness::runner::{PromptRunner, RunOptions, TraceLookup};
use galileo_harness::setup::{self, SetupOptions};
use galileo_harness::telemetry::LoggingFlusher;
use galileo_harness::types::MetricSet;
use galileo_harness::{openapi, scaffold, PollOutcome, TraceQuery};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "galileo-harness")]
#[command(version, about = "Galileo API workflows and docs tooling", long_about = None)]
struct Cli {
    /// Override GALILEO_CONSOLE_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// `.env` file loaded before reading the environment
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark non-allow-listed OpenAPI operations as x-excluded
    OpenapiExclude {
        #[arg(long, default_value = "openapi.json")]
        file: PathBuf,
        /// Path prefixes that stay visible (repeatable)
        #[arg(long = "include", default_values_t = vec!["/v2".to_string()])]
        include: Vec<String>,
    },
    /// Write documentation page stubs
    ScaffoldDocs {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Create or reuse a project and log stream, enable scorers, update .env
    SetupProject {
        #[arg(default_value = setup::DEFAULT_PROJECT)]
        project: String,
        #[arg(default_value = setup::DEFAULT_LOG_STREAM)]
        log_stream: String,
        /// Scorer to enable (repeatable)
        #[arg(long = "scorer", default_values_t = vec!["instruction_adherence".to_string()])]
        scorers: Vec<String>,
        /// Skip writing the .env file
        #[arg(long)]
        no_env: bool,
    },
    /// Enable a scorer through the project's evaluate settings
    RegisterScorer {
        #[arg(default_value = "instruction_adherence")]
        name: String,
    },
    /// Run two prompts and compare a metric
    Compare {
        #[arg(long)]
        original: String,
        #[arg(long)]
        improved: String,
        /// Metric to wait for and compare (repeatable)
        #[arg(long = "metric", default_values_t = vec!["instruction_adherence".to_string()])]
        metrics: Vec<String>,
        #[arg(long, default_value = "gpt-4o")]
        model: String,
        /// Seconds to wait for each metric
        #[arg(long, default_value_t = 120)]
        max_wait: u64,
        /// Seconds between polls
        #[arg(long, default_value_t = 10)]
        interval: u64,
        /// Seconds between the two runs
        #[arg(long, default_value_t = 5)]
        delay: u64,
        #[arg(long)]
        max_words: Option<usize>,
        /// Find traces by response content instead of taking the newest
        #[arg(long)]
        by_content: bool,
    },
    /// List recent traces with their metrics
    Traces {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Wait for a metric on a trace
    WaitMetric {
        trace_id: String,
        #[arg(long, default_value = "instruction_adherence")]
        metric: String,
        #[arg(long, default_value_t = 120)]
        max_wait: u64,
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
    /// List datasets, or show one by name
    Datasets {
        #[arg(long)]
        name: Option<String>,
    },
    /// List experiments, or show one by name (case-insensitive substring)
    Experiments {
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    envfile::load(&cli.env_file)
        .with_context(|| format!("reading {}", cli.env_file.display()))?;

    match cli.command {
        Commands::OpenapiExclude { file, include } => {
            let summary = openapi::exclude_file(&file, &include)?;
            println!(
                "{}: {} of {} paths excluded ({} operations)",
                file.display(),
                summary.excluded_paths,
                summary.paths,
                summary.excluded_operations
            );
        }
        Commands::ScaffoldDocs { dir } => {
            let written = scaffold::scaffold_docs(&dir)?;
            println!("Updated {} pages under {}", written.len(), dir.display());
        }
        Commands::SetupProject {
            project,
            log_stream,
            scorers,
            no_env,
        } => {
            let client = connect(cli.api_url.as_deref()).await?;
            let options = SetupOptions {
                project,
                log_stream,
                scorers,
                env_file: (!no_env).then(|| cli.env_file.clone()),
            };
            let report = setup::setup_project(&client, &options).await?;
            println!("Setup completed successfully!");
            println!("Project Name:    {}", report.project.name);
            println!("Project ID:      {}", report.project.id);
            println!("Log Stream Name: {}", report.log_stream.name);
            println!("Log Stream ID:   {}", report.log_stream.id);
            if let Some(path) = report.env_file {
                println!(".env file created/updated in {}", path.display());
            }
        }
        Commands::RegisterScorer { name } => {
            let client = connect(cli.api_url.as_deref()).await?;
            let project = client.find_project(client.config.require_project()?).await?;
            let settings = client.register_scorer(&project.id, &name).await?;
            println!("Registered {} for project {}", name, project.name);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::Compare {
            original,
            improved,
            metrics,
            model,
            max_wait,
            interval,
            delay,
            max_words,
            by_content,
        } => {
            config::check_environment(&config::STANDARD_VARS)?;
            let client = Arc::new(connect(cli.api_url.as_deref()).await?);
            let (project, stream) = client.resolve_configured().await?;
            let chat = Arc::new(ChatClient::from_config(&client.config)?);

            let poll = PollStrategy::fixed(Duration::from_secs(interval), Duration::from_secs(max_wait));
            let mut options = RunOptions::default()
                .with_model(model)
                .with_metrics(metrics.clone())
                .with_metric_poll(poll.clone())
                .with_delay(Duration::from_secs(delay));
            if by_content {
                options = options.with_trace_lookup(TraceLookup::ByContent { snippet_chars: 40 }, poll);
            }

            let runner = PromptRunner::new(client.clone(), chat, project.id, stream.id)
                .with_flusher(Arc::new(LoggingFlusher))
                .with_options(options);
            let (first, second) = runner.run_comparison(&original, &improved).await?;

            for (label, run) in [("Original", &first), ("Improved", &second)] {
                println!("\n{} response:\n{}\n", label, run.content());
                if max_words.is_some() {
                    println!("{}", check_word_count(run.content(), max_words));
                }
                print!("{}", report::render_metrics_table(&run.metrics));
            }
            for metric in &metrics {
                match report::compare(&first.metrics, &second.metrics, metric) {
                    Some(cmp) => print!("\n{}", cmp),
                    None => println!(
                        "\nCannot compare {} - one or both metrics are missing",
                        metric
                    ),
                }
            }
        }
        Commands::Traces { limit } => {
            let client = connect(cli.api_url.as_deref()).await?;
            let (project, stream) = client.resolve_configured().await?;
            let traces = client
                .search_traces(&project.id, &TraceQuery::new(&stream.id).limit(limit))
                .await?;
            if traces.is_empty() {
                println!("No traces found");
            }
            for trace in traces {
                println!(
                    "\nTrace {} ({})",
                    trace.id,
                    trace.created_at.as_deref().unwrap_or("-")
                );
                if let Some(output) = trace.output_text() {
                    println!("Output: {}", output);
                }
                let metrics = trace
                    .metrics
                    .as_ref()
                    .map(MetricSet::from_value)
                    .unwrap_or_default();
                print!("{}", report::render_metrics_table(&metrics));
            }
        }
        Commands::WaitMetric {
            trace_id,
            metric,
            max_wait,
            interval,
        } => {
            let client = connect(cli.api_url.as_deref()).await?;
            let project = client.find_project(client.config.require_project()?).await?;
            let strategy =
                PollStrategy::fixed(Duration::from_secs(interval), Duration::from_secs(max_wait));
            let outcome = client
                .wait_for_metric(&project.id, &trace_id, &metric, &strategy)
                .await;
            let attempts = outcome.attempts();
            match outcome {
                PollOutcome::Ready { value, .. } => {
                    print!("{}", report::render_metrics_table(&value))
                }
                PollOutcome::TimedOut { elapsed, .. } => bail!(
                    "{} not available after {} attempts ({:.0}s)",
                    metric,
                    attempts,
                    elapsed.as_secs_f64()
                ),
                PollOutcome::Failed { error, .. } => return Err(error.into()),
            }
        }
        Commands::Datasets { name } => {
            let client = connect(cli.api_url.as_deref()).await?;
            let project_id = match client.config.project.clone() {
                Some(name) => Some(client.find_project(&name).await?.id),
                None => None,
            };
            match name {
                Some(name) => {
                    let dataset = client.find_dataset_by_name(project_id.as_deref(), &name).await?;
                    println!("Dataset {} ({}): {} entries", dataset.name, dataset.id, dataset.entries.len());
                    for entry in &dataset.entries {
                        println!("  {}", entry);
                    }
                }
                None => {
                    for d in client.list_datasets(project_id.as_deref()).await? {
                        println!("{}\t{}", d.id, d.name);
                    }
                }
            }
        }
        Commands::Experiments { name } => {
            let client = connect(cli.api_url.as_deref()).await?;
            let project = client.find_project(client.config.require_project()?).await?;
            match name {
                Some(name) => {
                    let found = client.find_experiment_by_name(&project.id, &name).await?;
                    let experiment = client.get_experiment(&project.id, &found.id).await?;
                    println!("{}", serde_json::to_string_pretty(&experiment)?);
                }
                None => {
                    for e in client.list_experiments(&project.id).await? {
                        println!("{}\t{}", e.id, e.name);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn connect(api_url: Option<&str>) -> anyhow::Result<GalileoClient> {
    let config = HarnessConfig::from_env().context("loading configuration")?;
    let mut builder = GalileoClient::builder(config);
    if let Some(url) = api_url {
        builder = builder.base_url_override(url);
    }
    Ok(builder.build().await?)
}
