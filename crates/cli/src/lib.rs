//! nightswatch command line
//!
//! Parses arguments, loads the config file and hands off to the daemon.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use nightswatch_core::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod daemon;

/// nightswatch - A configurable file watcher
#[derive(Parser, Debug)]
#[command(name = "nightswatch")]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Read a specific config file
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Print the version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: (),
}

/// Install the global log subscriber
///
/// Honors `RUST_LOG`, defaulting to `info`. Logs go to stderr.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the configuration named on the command line and watch until failure
pub async fn run(cli: Cli) -> Result<()> {
    let config = nightswatch_core::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    daemon::start(config).await
}
