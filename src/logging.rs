/// File logging. The terminal is in raw mode while playing, so nothing is
/// written to stdout/stderr; `RUST_LOG` filters as usual (default `info`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "treasure-grid.log";

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init() -> Result<(WorkerGuard, PathBuf)> {
    let dir = log_directory();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("installing tracing subscriber")?;

    Ok((guard, dir.join(LOG_FILE)))
}

/// `$XDG_STATE_HOME/treasure-grid`, `~/.local/state/treasure-grid`,
/// or the temp dir.
fn log_directory() -> PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME").filter(|s| !s.is_empty()) {
        return PathBuf::from(state).join("treasure-grid");
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".local/state/treasure-grid");
    }
    std::env::temp_dir().join("treasure-grid")
}
