use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub const LOG_ENV: &str = "APOD_TUI_LOG";

/// Sends `tracing` output to a log file; the terminal belongs to the UI.
pub fn init(cfg: &LogConfig) -> Option<PathBuf> {
    let path = log_path(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(cfg.level.trim()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;

    Some(path)
}

pub fn log_path(cfg: &LogConfig) -> Option<PathBuf> {
    cfg.file
        .clone()
        .or_else(|| dirs::data_dir().map(|dir| dir.join("apod-tui").join("apod-tui.log")))
}
