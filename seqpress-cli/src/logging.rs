// ============================================================================
// seqpress-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern Dispatch for Console and Run Log File
//
// The core only emits `log` records. This module routes them to two sinks:
// stderr with a colored level, and a timestamped run log file in the log
// directory.
//
// AI-ASSISTANT-INFO: Logging initialization and helpers

use crate::error::CliResult;

use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use seqpress_core::CoreError;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Name of the run log file for a run started now.
pub fn run_log_file_name() -> String {
    format!("seqpress_run_{}.log", get_timestamp())
}

fn console_level(level: Level, use_color: bool) -> String {
    if !use_color {
        return level.to_string();
    }
    match level {
        Level::Error => level.red().bold().to_string(),
        Level::Warn => level.yellow().to_string(),
        Level::Info => level.green().to_string(),
        Level::Debug => level.cyan().to_string(),
        Level::Trace => level.dimmed().to_string(),
    }
}

/// Installs the global logger and returns the path of the run log file.
///
/// `log_dir` must already exist. `verbose` lowers the level from info to debug.
pub fn setup_logging(log_dir: &Path, verbose: bool) -> CliResult<PathBuf> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let log_path = log_dir.join(run_log_file_name());
    let use_color = console::colors_enabled_stderr();

    let console_dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!("{} {}", console_level(record.level(), use_color), message))
        })
        .chain(std::io::stderr());

    let file_dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(fern::log_file(&log_path)?);

    fern::Dispatch::new()
        .level(level)
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))?;

    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_file_name_format() {
        let name = run_log_file_name();
        assert!(name.starts_with("seqpress_run_"));
        assert!(name.ends_with(".log"));
        // seqpress_run_ + YYYYMMDD_HHMMSS + .log
        assert_eq!(name.len(), "seqpress_run_".len() + 15 + ".log".len());
    }

    #[test]
    fn test_plain_console_level() {
        assert_eq!(console_level(Level::Warn, false), "WARN");
    }
}
