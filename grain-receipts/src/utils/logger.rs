//! Logging Infrastructure
//!
//! Console output goes to stderr so that stdout carries only the JSON report.
//! When a log directory is given, a daily rotating JSON file is written too.

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Prefix of the rotating log files
pub const LOG_FILE_PREFIX: &str = "grain-receipts";

/// Initialize the logger
///
/// `RUST_LOG` overrides `level` when set.
pub fn init_logger_with_file(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            let dir = Path::new(dir);
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_writer(appender)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_layer_writes_and_second_init_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("logs");
        let first = init_logger_with_file("debug", false, dir.to_str());
        assert!(first.is_ok());
        assert!(dir.is_dir());

        tracing::warn!(marker = "rolling-file-check", "Logger ready");
        let written = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX))
            .any(|entry| {
                std::fs::read_to_string(entry.path())
                    .map(|content| content.contains("rolling-file-check"))
                    .unwrap_or(false)
            });
        assert!(written);

        let second = init_logger_with_file("info", true, None);
        assert!(second.is_err());
    }
}
