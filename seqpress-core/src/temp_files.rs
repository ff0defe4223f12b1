//! Temporary and partial file paths.
//!
//! Concat lists are created with the tempfile crate for a unique name, then
//! detached from tempfile's drop-based cleanup so that the [`ArtifactTracker`]
//! alone decides when they go away (including from the signal path).

use crate::artifacts::ArtifactTracker;
use crate::config::CoreConfig;
use crate::error::CoreResult;

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::Builder as TempFileBuilder;

/// Suffix appended to a destination while ffmpeg is still writing it.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Returns `destination` with [`PARTIAL_SUFFIX`] appended (`a.MP4` -> `a.MP4.partial`).
pub fn partial_output_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Directory concat lists are written to: the configured temp dir, or the
/// system temp dir.
pub fn temp_base_dir(config: &CoreConfig) -> PathBuf {
    config.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
}

/// Creates a uniquely named, empty temp file and registers it with `tracker`
/// before returning it for writing.
pub fn create_tracked_temp_file(
    tracker: &ArtifactTracker,
    dir: &Path,
    prefix: &str,
    extension: &str,
) -> CoreResult<(File, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!("{prefix}_"))
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    let (file, path) = temp_file.keep().map_err(|e| e.error)?;
    tracker.register_temp_file(&path);
    Ok((file, path))
}
