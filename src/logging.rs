use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Where log output goes.
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// Nothing is logged; used while the TUI owns the terminal.
    Off,
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Writer that hands lines to a background thread, so logging never blocks
/// the UI loop. Buffered lines are flushed when the guard drops.
fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity level.
///
/// For file output the returned guard must be held until the program exits.
pub fn init(verbosity: u8, target: LogTarget<'_>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    match target {
        LogTarget::Off => Ok(None),
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .map_err(|e| anyhow!(e))?;
            Ok(None)
        }
        LogTarget::File(path) => {
            let (writer, guard) = file_writer(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!(e))?;
            tracing::info!("Logging initialized: file={}", path.display());
            Ok(Some(guard))
        }
    }
}
