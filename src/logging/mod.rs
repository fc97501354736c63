//! Diagnostic logging to disk.
//!
//! Installs a `tracing` subscriber that writes to a daily log file named
//! `shelbot_<date>.log` in the configured log directory (default:
//! `~/.local/share/shelbot/logs/`). `RUST_LOG` overrides the configured
//! filter. Falls back to stderr if the log file cannot be created.

use crate::config::{expand_home, LoggingConfig};
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Path of today's log file inside `log_dir`.
pub fn log_file_path(log_dir: &Path, date: chrono::NaiveDate) -> PathBuf {
    log_dir.join(format!("shelbot_{}.log", date.format("%Y-%m-%d")))
}

/// Build the level filter. `from_env` (the `RUST_LOG` value) wins when it
/// is set and valid; an invalid value is reported and the configured filter
/// used instead.
fn env_filter(from_env: Option<&str>, configured: &str) -> Result<EnvFilter> {
    if let Some(directives) = from_env.filter(|d| !d.trim().is_empty()) {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return Ok(filter),
            Err(e) => eprintln!("Ignoring invalid {} {:?}: {}", EnvFilter::DEFAULT_ENV, directives, e),
        }
    }
    EnvFilter::try_new(configured).with_context(|| format!("Invalid log filter {:?}", configured))
}

fn open_log_file(log_dir: &Path, path: &Path) -> io::Result<File> {
    fs::create_dir_all(log_dir)?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Writer for the fmt layer: the log file when it opened, stderr otherwise.
/// Also returns whether to use ANSI colours and the file in use.
fn log_writer(file: io::Result<File>, path: PathBuf) -> (BoxMakeWriter, bool, Option<PathBuf>) {
    match file {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false, Some(path)),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}, logging to stderr", path.display(), e);
            (BoxMakeWriter::new(io::stderr), true, None)
        }
    }
}

/// Install the global subscriber. Returns the log file in use, or `None`
/// when logging went to stderr.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(from_env.as_deref(), &config.filter)?;

    let log_dir = expand_home(&config.log_dir);
    let path = log_file_path(&log_dir, chrono::Local::now().date_naive());
    let file = open_log_file(&log_dir, &path);
    let (writer, ansi, used) = log_writer(file, path);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(false),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(used)
}
