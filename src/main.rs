use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use waitline::{simulate, simulate_parallel, Ledger, Mode, SimulationConfig};

/// Network request wait time simulation.
///
/// Replays a CSV of `timestamp,label,process_time` rows through one or more first-come-first-served
/// servers and reports the average wait.
#[derive(Parser, Debug)]
#[command(name = "waitline")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the CSV file containing network requests
    #[arg(long)]
    file: PathBuf,

    /// Number of servers to simulate. Defaults to 1 if not specified
    #[arg(long, allow_negative_numbers = true)]
    servers: Option<i64>,

    /// Replay each server on its own task
    #[arg(long)]
    parallel: bool,

    /// Print each server's stats after the result
    #[arg(long)]
    per_server: bool,

    /// Log level (trace, debug, info, warn, error). Overridden by RUST_LOG
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mode = Mode::from_requested(cli.servers)?;
    let config = SimulationConfig::builder().mode(mode).build();

    let ledger = Ledger::from_path(&cli.file)
        .with_context(|| format!("Failed to load requests from {}", cli.file.display()))?;
    info!(requests = ledger.len(), %mode, "Simulating");

    let report = if cli.parallel {
        simulate_parallel(ledger, &config).await?
    } else {
        simulate(ledger, &config)
    };

    println!("{}", report.summary_line());
    if cli.per_server {
        print!("{report}");
    }

    Ok(())
}
