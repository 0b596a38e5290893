//! Process-wide logging context
//!
//! Lines go to the console and are appended to a daily log file
//! (`logs/log_YYYY-MM-DD.log`). The context is built once in `main` and lives
//! until the process exits.

use crate::errors::{IngestionError, Result};
use chrono::{Local, NaiveDate};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOGS_DIR: &str = "logs";

/// Logging settings resolved from the command line and environment
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub dir: PathBuf,
    /// Forces `debug`, otherwise `RUST_LOG` or `info` applies
    pub verbose: bool,
}

/// Handle to the installed logger
#[derive(Debug, Clone)]
pub struct LogContext {
    file_path: PathBuf,
}

impl LogContext {
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// `log_2024-05-01.log`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("log_{}.log", date.format("%Y-%m-%d"))
}

/// Open today's log file in append mode, creating the directory if needed.
pub fn open_log_file(dir: &Path, date: NaiveDate) -> Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir).map_err(|e| {
        IngestionError::io(format!("Failed to create log directory {}", dir.display()), e)
    })?;

    let path = dir.join(log_file_name(date));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| IngestionError::io(format!("Failed to open log file {}", path.display()), e))?;

    Ok((path, file))
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(settings: &LogSettings) -> Result<LogContext> {
    let (file_path, file) = open_log_file(&settings.dir, Local::now().date_naive())?;

    let filter = if settings.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| IngestionError::config_caused("Failed to install logger", e))?;

    Ok(LogContext { file_path })
}
