//! Rolling Logger
//!
//! Log bootstrap shared by the backend:
//! - file sink that rotates by size (`<app>.log`, `<app>.log.1`, ...)
//! - in-memory circular buffer of the most recent lines
//! - `log` records are bridged into `tracing`

mod buffer;
mod writer;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use buffer::LogBuffer;
pub use writer::{RollingFile, RollingWriter};

/// Default cap for a single log file before it rotates
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
/// Default number of rotated files kept next to the live one
pub const DEFAULT_MAX_FILES: usize = 3;
/// Default number of lines kept in memory
pub const DEFAULT_BUFFER_LINES: usize = 500;

static BUFFER: OnceLock<LogBuffer> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("failed to prepare log directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
}

/// Initialize logging into `log_dir` with default rotation settings.
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(log_dir, app_name, DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_FILES)
}

/// Initialize logging with explicit rotation limits.
pub fn init_logger_with(
    log_dir: PathBuf,
    app_name: &str,
    max_file_bytes: u64,
    max_files: usize,
) -> Result<(), LoggerError> {
    if BUFFER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    std::fs::create_dir_all(&log_dir).map_err(|source| LoggerError::Io {
        path: log_dir.clone(),
        source,
    })?;

    let buffer = BUFFER.get_or_init(|| LogBuffer::new(DEFAULT_BUFFER_LINES));

    #[cfg(target_os = "android")]
    {
        let _ = (max_file_bytes, max_files, buffer);
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag(app_name.to_string()),
        );
        return Ok(());
    }

    #[cfg(not(target_os = "android"))]
    {
        let file = RollingFile::new(log_dir.join(format!("{}.log", app_name)), max_file_bytes, max_files);
        let writer = RollingWriter::new(file, buffer.clone());

        tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .map_err(|_| LoggerError::AlreadyInitialized)?;

        tracing::info!(app = app_name, dir = %log_dir.display(), "logger initialized");
        Ok(())
    }
}

/// Log an info line through the installed subscriber
pub fn info(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", message);
    Ok(())
}

/// Log an error line through the installed subscriber
pub fn error(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::error!("{}", message);
    Ok(())
}

/// Most recent `count` log lines, oldest first
pub fn recent_lines(count: usize) -> Vec<String> {
    BUFFER.get().map(|b| b.recent(count)).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), LoggerError> {
    BUFFER.get().map(|_| ()).ok_or(LoggerError::NotInitialized)
}
