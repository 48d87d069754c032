//! Logging setup for the ETL binary.
//!
//! Console output always; optionally daily rolling files as well:
//! - `retail_etl.<date>.log`: every enabled level
//! - `error.<date>.log`: warnings and errors only
//!
//! The level defaults to `info` and can be overridden with `RUST_LOG`.
//!
//! ```no_run
//! retail_etl::logging::init(None).expect("Failed to initialize logging");
//! tracing::info!("Run started");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const MAX_LOG_FILES: usize = 10;

/// Platform log directory: `<data_dir>/retail_etl/logs`.
///
/// - Windows: `%APPDATA%/retail_etl/logs`
/// - macOS: `~/Library/Application Support/retail_etl/logs`
/// - Linux: `~/.local/share/retail_etl/logs`
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|base| base.join("retail_etl").join("logs"))
}

fn rolling_appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log appender"))
}

/// Initializes console logging, plus rolling files when `log_dir` is given.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or a file appender
/// fails to open.
pub fn init(log_dir: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let (all_logs_layer, error_logs_layer) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let all_logs = fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .with_ansi(false)
                .with_writer(rolling_appender(dir, "retail_etl")?);

            let error_logs = fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .with_ansi(false)
                .with_writer(rolling_appender(dir, "error")?)
                .with_filter(EnvFilter::new("warn"));

            (Some(all_logs), Some(error_logs))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .init();

    match log_dir {
        Some(dir) => tracing::debug!("Logging initialized, log directory: {}", dir.display()),
        None => tracing::debug!("Logging initialized, console only"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir_layout() {
        if let Some(log_dir) = default_log_dir() {
            assert!(log_dir.ends_with("retail_etl/logs") || log_dir.ends_with("retail_etl\\logs"));
        }
    }
}
