//! Main entry point for the gramscope CLI

use clap::Parser;
use gramscope::cli::{Cli, Commands};
use gramscope::shutdown::StopSignal;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // JSON output requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gramscope=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Start the Prometheus exporter when METRICS_ADDR is set.
fn init_metrics() {
    let Ok(addr) = std::env::var("METRICS_ADDR") else {
        return;
    };
    match addr.parse() {
        Ok(addr) => {
            if let Err(e) = gramscope::metrics::init_metrics(addr) {
                error!("Failed to start metrics exporter: {e}");
            }
        }
        Err(e) => error!("Invalid METRICS_ADDR '{addr}': {e}"),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    init_metrics();

    let cli = Cli::parse();

    let stop = StopSignal::new();
    stop.trip_on_ctrl_c();

    let result = match cli.command {
        Commands::Analyze(ref args) => args.execute(&cli, stop.clone()).await,
        Commands::Login(ref args) => args.execute(&cli).await,
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
