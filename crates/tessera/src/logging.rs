//! File-backed `tracing` setup. The terminal itself is owned by the UI.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::project_dirs;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "TESSERA_LOG";

/// Install the global subscriber writing to `tessera.log`.
///
/// Logging stays disabled if the log file cannot be opened.
pub fn init(default_filter: &str) -> Option<PathBuf> {
    let path = log_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .ok()?;

    Some(path)
}

fn log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("tessera.log"))
}
