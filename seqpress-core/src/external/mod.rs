// ============================================================================
// seqpress-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools
//
// This module encapsulates every subprocess the orchestrator drives: ffprobe
// for stream metadata, ffmpeg for the concat + transcode, udtacopy for the
// GoPro telemetry box and exiftool for container tags. Each tool sits behind a
// trait so the orchestrator can be exercised against test doubles.
//
// KEY COMPONENTS:
// - FfprobeExecutor: Raw stream probing (ffprobe crate)
// - FfmpegSpawner / FfmpegProcess: ffmpeg execution (ffmpeg-sidecar)
// - MetadataCopier: Source -> destination metadata copy (udtacopy, exiftool)
// - Toolchain: The four collaborators bundled together
// - check_dependency: Startup check that a tool can be launched
//
// DESIGN PHILOSOPHY:
// Arguments always travel as structured vectors straight to the process, never
// through a shell, so clip paths need no quoting.
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// ffmpeg argument building for the concat + transcode invocation
pub mod ffmpeg;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for executing ffprobe
pub mod ffprobe_executor;

/// Telemetry and tag copiers
pub mod metadata;

/// Scripted test doubles for every tool trait (unit tests and "test-mocks")
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::{TranscodeParams, build_transcode_command};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_ffmpeg};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor};
pub use metadata::{ExiftoolTagCopier, MetadataCopier, UdtaCopier};

// ============================================================================
// TOOLCHAIN
// ============================================================================

/// The external collaborators the orchestrator depends on.
///
/// - `P`: probes a file into a `StreamSet`
/// - `S`: runs ffmpeg invocations
/// - `T`: copies the telemetry box from source to destination
/// - `G`: copies container tags from source to destination
#[derive(Debug, Clone)]
pub struct Toolchain<P, S, T, G> {
    pub prober: P,
    pub spawner: S,
    pub telemetry: T,
    pub tags: G,
}

impl Toolchain<CrateFfprobeExecutor, SidecarSpawner, UdtaCopier, ExiftoolTagCopier> {
    /// The real tools found on `PATH`.
    pub fn system() -> Self {
        Self {
            prober: CrateFfprobeExecutor::new(),
            spawner: SidecarSpawner,
            telemetry: UdtaCopier::default(),
            tags: ExiftoolTagCopier::default(),
        }
    }
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `cmd_name` with `version_arg` and discards the output; only whether
/// the process could be launched matters.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - If the command is not on `PATH`
/// * `CoreError::CommandFailed` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(crate::error::command_start_error(
                format!("checking dependency {cmd_name}"),
                e,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_is_reported() {
        let result = check_dependency("seqpress-no-such-tool-42", "-version");
        match result {
            Err(CoreError::DependencyNotFound(name)) => assert_eq!(name, "seqpress-no-such-tool-42"),
            other => panic!("Unexpected result: {other:?}"),
        }
    }
}
