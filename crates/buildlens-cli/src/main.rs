use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use buildlens_core::config::LoggingConfig;
use buildlens_core::ports::SystemClock;
use buildlens_core::{BuildContext, BuildOutcome, BuildlensConfig, ReportPipeline};

const DEFAULT_CONFIG: &str = "buildlens.toml";

#[derive(Debug, Parser)]
#[command(name = "buildlens", version, about = "Publish build metrics to configured sinks")]
struct Args {
    /// Configuration file. Defaults to ./buildlens.toml when it exists.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a report from a recorded build and publish it.
    Publish {
        /// JSON document with `outcome` and `context`.
        #[arg(long, short)]
        build: PathBuf,
    },
    /// Load the configuration, compile filters and list the enabled sinks.
    Check,
}

/// One recorded build, as written by the build-tool integration.
#[derive(Debug, Deserialize)]
struct BuildRun {
    outcome: BuildOutcome,
    #[serde(default)]
    context: BuildContext,
}

#[tokio::main]
async fn main() -> ExitCode {
    match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("buildlens: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn real_main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.logging)?;

    let pipeline = ReportPipeline::from_config(&config, Arc::new(SystemClock))
        .context("invalid configuration")?;

    match args.command {
        Command::Check => {
            let sinks = buildlens_core::sinks::from_config(&config, Arc::new(SystemClock));
            for sink in &sinks {
                println!("{}", sink.name());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Publish { build } => {
            let raw = std::fs::read_to_string(&build)
                .with_context(|| format!("failed to read {}", build.display()))?;
            let run: BuildRun = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse {}", build.display()))?;

            let Some(handle) = pipeline.publish(run.outcome, &run.context) else {
                return Ok(ExitCode::SUCCESS);
            };
            let summary = handle.join().await;
            tracing::info!(
                published = summary.published,
                failed = summary.failed,
                "publication finished"
            );
            // a failed sink never fails the build it reports on
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BuildlensConfig> {
    let mut config = match path {
        Some(path) => BuildlensConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            BuildlensConfig::load(Path::new(DEFAULT_CONFIG))?
        }
        None => BuildlensConfig::default(),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("invalid log level '{}'", logging.level))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}
