//! Metadata copiers.
//!
//! Two external tools carry source information over to the new file:
//! `udtacopy` copies the `udta` box that holds GoPro telemetry, and `exiftool`
//! copies the container tags. Both run as plain argument vectors.

use crate::artifacts::ArtifactTracker;
use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};

use std::path::Path;
use std::process::{Command, Stdio};

/// Copies some class of metadata from `source` to `destination`.
///
/// Implementations that run a process track it in `tracker` while it runs.
pub trait MetadataCopier {
    fn copy_metadata(&self, tracker: &ArtifactTracker, source: &Path, destination: &Path) -> CoreResult<()>;
}

/// Copies the telemetry (`udta`) box with `udtacopy <src> <dst>`.
#[derive(Debug, Clone)]
pub struct UdtaCopier {
    pub program: String,
}

impl Default for UdtaCopier {
    fn default() -> Self {
        Self {
            program: "udtacopy".to_string(),
        }
    }
}

impl MetadataCopier for UdtaCopier {
    fn copy_metadata(&self, tracker: &ArtifactTracker, source: &Path, destination: &Path) -> CoreResult<()> {
        let purpose = format!("copying telemetry from {}", source.display());
        let mut cmd = Command::new(&self.program);
        cmd.arg(source).arg(destination);
        run_copier(tracker, cmd, &purpose)
    }
}

/// Copies container tags with
/// `exiftool -overwrite_original -TagsFromFile <src> -all:all <dst>`.
#[derive(Debug, Clone)]
pub struct ExiftoolTagCopier {
    pub program: String,
}

impl Default for ExiftoolTagCopier {
    fn default() -> Self {
        Self {
            program: "exiftool".to_string(),
        }
    }
}

impl MetadataCopier for ExiftoolTagCopier {
    fn copy_metadata(&self, tracker: &ArtifactTracker, source: &Path, destination: &Path) -> CoreResult<()> {
        let purpose = format!("copying tags from {}", source.display());
        let mut cmd = Command::new(&self.program);
        cmd.arg("-overwrite_original")
            .arg("-TagsFromFile")
            .arg(source)
            .arg("-all:all")
            .arg(destination);
        run_copier(tracker, cmd, &purpose)
    }
}

fn run_copier(tracker: &ArtifactTracker, mut cmd: Command, purpose: &str) -> CoreResult<()> {
    log::debug!("Running {:?}", cmd);
    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| command_start_error(purpose, e))?;

    let _running = tracker.track_process(child.id());
    let output = child
        .wait_with_output()
        .map_err(|e| command_wait_error(purpose, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::error!("Metadata copy failed while {}: {}", purpose, output.status);
        return Err(command_failed_error(purpose, output.status, stderr));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_missing_program_is_command_failed() {
        let copier = UdtaCopier {
            program: "seqpress-no-such-udtacopy".to_string(),
        };
        let err = copier
            .copy_metadata(&ArtifactTracker::new(), Path::new("/tmp/a.mp4"), Path::new("/tmp/b.mp4"))
            .unwrap_err();
        match err {
            CoreError::CommandFailed { purpose, .. } => {
                assert!(purpose.starts_with("copying telemetry from"));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_command_failed() {
        let copier = ExiftoolTagCopier {
            program: "false".to_string(),
        };
        let tracker = ArtifactTracker::new();
        let err = copier
            .copy_metadata(&tracker, Path::new("/tmp/a.mp4"), Path::new("/tmp/b.mp4"))
            .unwrap_err();
        assert!(matches!(err, CoreError::CommandFailed { .. }));
        assert!(tracker.tracked_processes().is_empty());
        assert!(err.to_string().contains("copying tags from /tmp/a.mp4"));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_copy_releases_process() {
        let copier = UdtaCopier {
            program: "true".to_string(),
        };
        let tracker = ArtifactTracker::new();
        copier
            .copy_metadata(&tracker, Path::new("/tmp/a.mp4"), Path::new("/tmp/b.mp4"))
            .unwrap();
        assert!(tracker.tracked_processes().is_empty());
    }
}
