//! Logging initialization for analysis runs.
//!
//! Two modes are supported:
//! - Cli mode: logs to STDOUT.
//! - File mode: logs as JSON lines to a rolling file in a caller-supplied directory.
//!
//! File logs are rolled over when they reach 5 MB. Rotated logs are
//! compressed. The maximum number of rotated logs is 20.
//!
//! The analyzer library only emits `tracing` events and never installs a
//! subscriber. A front end embedding it (a CLI or a service) calls [`init`]
//! once at startup and holds the returned [`LoggingGuards`] until exit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use file_rotate::{ContentLimit, FileRotate, compression::Compression, suffix::AppendCount};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt::writer::MakeWriterExt};

pub const LOG_FILE_NAME: &str = "analysis.log";

pub enum LogMode {
    Cli,
    File { log_dir: PathBuf },
}

/// Guard that keeps background logging workers alive.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

pub fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

pub fn init(mode: LogMode, verbose: bool) -> Result<Option<LoggingGuards>> {
    let filter = build_filter(verbose);

    match mode {
        LogMode::Cli => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {e}"))?;
            Ok(None)
        }
        LogMode::File { log_dir } => {
            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("Failed to create log directory {log_dir:?}"))?;

            let writer = FileRotate::new(
                log_dir.join(LOG_FILE_NAME),
                AppendCount::new(20),
                ContentLimit::Bytes(5 * 1024 * 1024),
                Compression::OnRotate(1),
                None,
            );

            let (non_blocking, guard) = tracing_appender::non_blocking(writer);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking.with_max_level(tracing::Level::INFO))
                .with_ansi(false)
                .json()
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {e}"))?;

            Ok(Some(LoggingGuards {
                _guards: vec![guard],
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter_is_debug() {
        assert_eq!(
            build_filter(true).max_level_hint(),
            Some(tracing::level_filters::LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_file_mode_writes_into_log_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");

        let guards = init(
            LogMode::File {
                log_dir: log_dir.clone(),
            },
            false,
        )
        .expect("first subscriber installation should succeed");
        assert!(guards.is_some());

        tracing::info!("file logging is active");
        drop(guards);

        assert!(log_dir.join(LOG_FILE_NAME).exists());
        assert!(
            init(LogMode::Cli, false).is_err(),
            "a second global subscriber must be rejected"
        );
    }
}
