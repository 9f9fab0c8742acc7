//! Daemon lifecycle management
//!
//! Wires the configuration into the watcher: populate the watch set, build
//! the actions, then run the debounce loop until it fails or Ctrl-C.

use anyhow::{Context, Result};
use nightswatch_core::WatchConfig;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use watcher::{action_for, populate, ChangeFilter, DebounceLoop, EventSource, IntervalTicker};

/// Start watching and run until a fatal error or Ctrl-C
pub async fn start(config: WatchConfig) -> Result<()> {
    start_until(config, shutdown_signal()).await
}

/// Start watching and run until a fatal error or `shutdown` completes
pub async fn start_until<F>(config: WatchConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let root = watch_root(&config.path)?;
    let filter =
        ChangeFilter::new(&root, config.pattern.as_deref()).context("Invalid match pattern")?;

    // Commands run from where the daemon was started, not from the watch root
    let workdir = std::env::current_dir().context("Failed to get current directory")?;
    let build = action_for("build", config.build.as_deref(), &workdir, config.timeout);
    let reload = action_for("reload", config.reload.as_deref(), &workdir, config.timeout);

    let mut source = EventSource::notify().context("Failed to start file watcher")?;
    populate(&root, &mut source).with_context(|| format!("Failed to watch {}", root.display()))?;

    info!(
        "Watching {} (interval: {:?}, match: {})",
        root.display(),
        config.interval,
        config.pattern.as_deref().unwrap_or("*")
    );

    DebounceLoop::new(IntervalTicker::new(config.interval))
        .with_filter(filter)
        .with_build(build)
        .with_reload(reload)
        .with_gate_reload(config.gate_reload)
        .run_until(source, shutdown)
        .await
        .context("File watcher stopped")
}

/// Resolve the configured root to the absolute form the OS reports events in
fn watch_root(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).with_context(|| format!("Failed to watch {}", path.display()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the daemon runs until killed
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
