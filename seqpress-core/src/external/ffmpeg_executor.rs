// ============================================================================
// seqpress-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and supervising FFmpeg
// processes. The orchestrator only ever sees the traits, so tests can replay
// scripted event streams and exit statuses instead of running ffmpeg.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - run_ffmpeg: Spawn, drain events, wait, and map failure to CommandFailed
//
// AI-ASSISTANT-INFO: FFmpeg process management and execution abstraction

use crate::artifacts::ArtifactTracker;
use crate::error::{
    CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error,
};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::process::ExitStatus;

// ---- Maximum number of ffmpeg error lines kept for the failure message ----
const MAX_STDERR_LINES: usize = 20;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;

    /// OS process id, when backed by a real process.
    fn id(&self) -> Option<u32> {
        None
    }
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess {
    child: FfmpegChild,
    pid: u32,
}

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.child.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            CoreError::CommandFailed {
                purpose: "reading ffmpeg output".to_string(),
                reason: e.to_string(),
            }
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child.wait().map_err(|e| command_wait_error("running ffmpeg", e))
    }

    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("launching ffmpeg", e))?;
        let pid = child.as_inner().id();
        Ok(SidecarProcess { child, pid })
    }
}

// --- Supervised execution ---

/// Runs one ffmpeg invocation to completion.
///
/// Blocks until ffmpeg exits; there is no timeout. Progress events are logged
/// at debug level and error lines are kept so that a non-zero exit can be
/// reported as `CoreError::CommandFailed` naming `purpose`. The process is
/// tracked in `tracker` while it runs so the shutdown path can stop it.
pub fn run_ffmpeg<S: FfmpegSpawner>(
    spawner: &S,
    tracker: &ArtifactTracker,
    cmd: FfmpegCommand,
    purpose: &str,
) -> CoreResult<()> {
    log::debug!("Running ffmpeg for {}: {:?}", purpose, cmd);

    let mut process = spawner.spawn(cmd)?;
    let _running = process.id().map(|pid| tracker.track_process(pid));
    let mut stderr_lines: Vec<String> = Vec::new();

    process.handle_events(|event| {
        match event {
            FfmpegEvent::Progress(progress) => {
                log::debug!(
                    "ffmpeg progress: frame={} time={} speed={:.2}x",
                    progress.frame,
                    progress.time,
                    progress.speed
                );
            }
            FfmpegEvent::Error(line) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                log::debug!("ffmpeg: {}", line);
                if stderr_lines.len() < MAX_STDERR_LINES {
                    stderr_lines.push(line);
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        log::error!("ffmpeg failed while {}: {}", purpose, status);
        return Err(command_failed_error(purpose, status, stderr_lines.join("\n")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockFfmpegSpawner;

    fn command(output: &str) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new();
        cmd.args(["-i", "list.txt", output]);
        cmd
    }

    #[test]
    fn test_success_leaves_no_tracked_process() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("out.mp4.partial", vec![], false);
        let tracker = ArtifactTracker::new();

        run_ffmpeg(&spawner, &tracker, command("out.mp4.partial"), "converting sequence 0001").unwrap();

        assert_eq!(spawner.get_received_calls().len(), 1);
        assert!(tracker.tracked_processes().is_empty());
    }

    #[test]
    fn test_non_zero_exit_names_purpose_and_error_lines() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation(
            "out.mp4.partial",
            vec![FfmpegEvent::Error("Invalid data found".to_string())],
            1,
            false,
        );
        let tracker = ArtifactTracker::new();

        let err = run_ffmpeg(&spawner, &tracker, command("out.mp4.partial"), "converting sequence 0001")
            .unwrap_err();
        match err {
            CoreError::CommandFailed { purpose, reason } => {
                assert_eq!(purpose, "converting sequence 0001");
                assert!(reason.contains("Invalid data found"));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
        assert!(tracker.tracked_processes().is_empty());
    }
}
