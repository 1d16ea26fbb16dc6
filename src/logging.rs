//! Tracing setup for the server binary.
//!
//! Everything goes to stdout in compact form. A copy is appended to `logs/rusty-rag.log`, or to
//! the path in `RUSTY_RAG_LOG_FILE`; setting that variable to `off` keeps logging on stdout only.
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_VAR: &str = "RUSTY_RAG_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/rusty-rag.log";

// Dropping the guard would discard buffered file output.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` filters both outputs (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = log_file_path(std::env::var(LOG_FILE_VAR).ok())
        .and_then(|path| match open_log_file(&path) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("Logging to stdout only, cannot open {}: {err}", path.display());
                None
            }
        })
        .map(|file| {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            fmt::layer().with_writer(writer).with_ansi(false).compact()
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

/// Resolve the log file from the configured value; `None` disables file output.
fn log_file_path(configured: Option<String>) -> Option<PathBuf> {
    match configured.as_deref().map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("off") => None,
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => Some(PathBuf::from(DEFAULT_LOG_FILE)),
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
