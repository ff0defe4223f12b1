//! Utility functions for formatting and file operations.
//!
//! This module provides general-purpose helpers used by the orchestrator and
//! the CLI summary: duration and byte formatting, size reduction, and safe
//! file name / size lookups.

use crate::error::{CoreError, CoreResult};
use std::path::Path;
use std::time::Duration;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// [`format_duration`] for a `Duration`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    format_duration(elapsed.as_secs_f64())
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Formats a bitrate in bits per second as Mbit/s with the 1024-based megabit
/// the bitrate knobs use.
#[must_use]
pub fn format_bitrate(bits_per_second: u64) -> String {
    format!("{:.2} Mbit/s", bits_per_second as f64 / (1024.0 * 1024.0))
}

/// Percentage size reduction from input to output, 0 when the output is not smaller.
#[must_use]
pub fn calculate_size_reduction(input_size: u64, output_size: u64) -> u64 {
    if input_size == 0 || output_size >= input_size {
        0
    } else {
        100 - ((output_size * 100) / input_size)
    }
}

/// Returns the file name of `path`, or a `PathError` if it has none.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| CoreError::PathError(format!("Failed to get filename for {}", path.display())))?
        .to_string_lossy()
        .to_string())
}

/// Size of the file at `path` in bytes.
pub fn get_file_size(path: &Path) -> CoreResult<u64> {
    Ok(std::fs::metadata(path)?.len())
}
