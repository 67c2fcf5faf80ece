//! Run one roster watch cycle and exit.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use rosterwatch::config::{ConfigError, DEFAULT_CONFIG_PATH, WatchConfig};
use rosterwatch::domain::{CycleError, WatchCycle, WatchCyclePorts};
use rosterwatch::outbound::hipchat::HipChatHttpClient;
use rosterwatch::outbound::snapshot::JsonFileSnapshotStore;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `rosterwatch` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rosterwatch",
    about = "Announce users who joined or left the chat directory since the last run",
    version
)]
struct CliArgs {
    /// Path to the JSON configuration file.
    #[arg(short = 'c', long = "config", value_name = "path", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Debug, Error)]
enum RunError {
    #[error("couldn't load configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("couldn't start runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("couldn't build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "roster watch failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

fn run(args: &CliArgs) -> Result<(), RunError> {
    let config = WatchConfig::load(&args.config)?;
    let client = Arc::new(HipChatHttpClient::from_config(&config).map_err(RunError::HttpClient)?);
    let store = Arc::new(JsonFileSnapshotStore::new(config.statefile()));
    let cycle = WatchCycle::new(
        WatchCyclePorts::new(client.clone(), client, store),
        config.recipients().to_vec(),
    );

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(RunError::Runtime)?;
    runtime.block_on(cycle.run())?;
    Ok(())
}
