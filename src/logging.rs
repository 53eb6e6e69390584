//! Tracing subscriber setup.
//!
//! The dashboard owns the terminal, so interactive runs log to a file. Headless export logs to
//! stderr.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub const LOG_FILE_NAME: &str = "tourism-dash.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// `logging.file` if set, else `<cache dir>/<app_name>/tourism-dash.log`.
pub fn default_log_path(config: &LoggingConfig, app_name: &str) -> Result<PathBuf> {
    if let Some(file) = &config.file {
        return Ok(file.clone());
    }
    let dir = dirs::cache_dir()
        .ok_or_else(|| eyre!("Could not determine cache directory for the log file"))?
        .join(app_name);
    Ok(dir.join(LOG_FILE_NAME))
}

/// `RUST_LOG` wins; otherwise the configured level applies to this crate and `warn` elsewhere.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,tourism_dash={}", config.level.to_lowercase()))
    })
}

/// Install the global subscriber. A second call is a no-op (the first subscriber stays).
pub fn init_tracing(config: &LoggingConfig, target: &LogTarget) -> Result<()> {
    let filter = env_filter(config);

    match target {
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .try_init();
        }
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact()
                .try_init();
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eyre!("Failed to open log file {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_file_takes_precedence() {
        let config = LoggingConfig {
            level: "info".to_string(),
            file: Some(PathBuf::from("/tmp/dash.log")),
        };
        assert_eq!(
            default_log_path(&config, "tourism-dash").unwrap(),
            PathBuf::from("/tmp/dash.log")
        );
    }

    #[test]
    fn open_log_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
