//! Process-wide log sink.
//!
//! The terminal is in raw mode while the TUI runs, so log output goes to a file
//! instead. [`init_logger`] installs the global `tracing` subscriber once and
//! hands back a [`LogGuard`]; [`close_logger`] flushes and closes the file.
//! Components never open the log file themselves, they only emit `tracing`
//! events.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::error::{ArborError, Result};

/// Keeps the log writer thread alive. The file is owned by that thread and is
/// closed once the guard is dropped; events emitted afterwards are discarded.
pub struct LogGuard {
    _worker: WorkerGuard,
    path: PathBuf,
}

impl LogGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open `path` in append mode and route all `tracing` output to it.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logger(path: &Path) -> Result<LogGuard> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let (writer, worker) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer),
        )
        .with(filter)
        .try_init()
        .map_err(|e| ArborError::Config(format!("Logger already initialized: {}", e)))?;

    tracing::info!("logging to {}", path.display());

    Ok(LogGuard {
        _worker: worker,
        path: path.to_path_buf(),
    })
}

/// Flush pending events and close the log file.
pub fn close_logger(guard: LogGuard) {
    tracing::info!("closing log {}", guard.path().display());
    drop(guard);
}
