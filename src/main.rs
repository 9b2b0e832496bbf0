//! Honeywell poller - Main Entry Point
//!
//! Runs a single poll cycle and exits. Schedule it with cron or a systemd
//! timer to collect a time series.

use clap::Parser;
use honeywell_poller::auth::{FileTokenStore, TokenStore};
use honeywell_poller::logging::{init_logging, LogConfig};
use honeywell_poller::monitoring::{InfluxSink, MetricsSink};
use honeywell_poller::{AppConfig, Poller, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Honeywell thermostat to InfluxDB poller
#[derive(Parser, Debug)]
#[command(name = "honeywell-poller")]
#[command(about = "Poll a Honeywell thermostat once and write its telemetry to InfluxDB")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file
    #[arg(long, env = "HONEYWELL_POLLER_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Token file holding the current OAuth token pair
    #[arg(long, env = "HONEYWELL_POLLER_TOKEN_FILE", default_value = "token.json")]
    token_file: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Also write logs to this file
    #[arg(long, env = "HONEYWELL_POLLER_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Fetch and extract, but do not write records or ping the liveness endpoint
    #[arg(long)]
    dry_run: bool,
}

fn setup(cli: &Cli) -> Result<Poller> {
    let config = AppConfig::load(&cli.config)?;

    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&cli.token_file));
    let sink: Arc<dyn MetricsSink> = Arc::new(InfluxSink::new(&config.influx));

    Ok(Poller::from_config(&config, store, sink)?.with_dry_run(cli.dry_run))
}

async fn run(cli: &Cli) -> Result<()> {
    let poller = setup(cli).map_err(|e| {
        error!(
            category = e.category(),
            exit_code = e.exit_code(),
            "Startup failed: {e}"
        );
        e
    })?;

    // poll cycle failures are logged with their stage by the poller
    let report = poller.run().await?;

    info!(
        device_id = %report.device_id,
        measurements = report.measurement_count,
        published = report.published,
        liveness = ?report.liveness,
        "Poll cycle complete"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(LogConfig::new(cli.debug, cli.log_file.clone())) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(e.exit_code()),
    }
}
