//! mems-sa (Similarity Analysis) - Listener perception vs. authored emotion
//!
//! Reads the listener response document and the reference profile table,
//! scores every rated song against its authored profile and writes a JSON
//! report to stdout or a file. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use mems_common::config::ConfigResolver;
use mems_sa::run_analysis;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mems-sa", version, about = "Music emotion similarity analysis")]
struct Args {
    /// Listener response document (JSON)
    #[arg(long, env = "MEMS_RESPONSES")]
    responses: Option<PathBuf>,

    /// Reference profile table (CSV)
    #[arg(long, env = "MEMS_REFERENCES")]
    references: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Entries listed in best/worst and per-emotion rankings
    #[arg(long)]
    top: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: it provides the default log level
    let resolved = ConfigResolver::new(args.config.clone()).resolve()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&resolved.config.logging.level)),
        )
        .init();

    info!(
        "Starting MEMS Similarity Analysis (mems-sa) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    resolved.log_summary();

    let mut config = resolved.config;
    if let Some(path) = args.responses {
        config.sources.responses = path;
    }
    if let Some(path) = args.references {
        config.sources.references = path;
    }
    if let Some(limit) = args.top {
        config.scoring.report_limit = limit;
    }
    config.scoring.validate()?;

    info!("Responses: {}", config.sources.responses.display());
    info!("References: {}", config.sources.references.display());

    let report = run_analysis(&config.sources, &config.scoring).await?;
    report.log_summary(config.scoring.report_limit);

    let json = report.to_json(args.pretty)?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
