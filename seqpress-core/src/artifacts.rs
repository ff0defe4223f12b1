// ============================================================================
// seqpress-core/src/artifacts.rs
// ============================================================================
//
// ARTIFACT TRACKING: Registry of In-Flight Temporary Files
//
// This module keeps track of every file the orchestrator creates that must not
// survive the process: concat lists handed to ffmpeg and partially written
// outputs. The registry is shared between the main execution path and the
// signal listener, so all of its state lives behind a single mutex.
//
// The external tool currently running is tracked here as well, so the signal
// path can stop it before deleting the files it writes.
//
// KEY COMPONENTS:
// - ArtifactTracker: Owned registry with idempotent registration and a
//   one-shot cleanup
// - ProcessRegistration: Scope guard for a running external process
// - remove_file_quietly: Deletion helper that ignores missing files
//
// AI-ASSISTANT-INFO: Crash-safe temp/partial file registry shared with the signal path

use log::{debug, warn};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct TrackerState {
    temp_files: BTreeSet<PathBuf>,
    partial_outputs: BTreeSet<PathBuf>,
    processes: BTreeSet<u32>,
    cleanup_done: bool,
    signal_handled: bool,
}

/// Process-wide registry of temporary artifacts.
///
/// Construct one at startup, wrap it in an `Arc`, and hand clones to the
/// orchestrator and the shutdown controller. Registration and unregistration
/// are plain set operations, so repeating them is harmless.
/// [`ArtifactTracker::cleanup_temporary_artifacts`] runs at most once for the
/// lifetime of the tracker, whichever caller reaches it first.
#[derive(Debug, Default)]
pub struct ArtifactTracker {
    state: Mutex<TrackerState>,
}

impl ArtifactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic on the main path must not stop the signal path from cleaning up.
    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_temp_file(&self, path: &Path) {
        debug!("Tracking temp file: {}", path.display());
        self.state().temp_files.insert(path.to_path_buf());
    }

    pub fn unregister_temp_file(&self, path: &Path) {
        self.state().temp_files.remove(path);
    }

    pub fn register_partial_output(&self, path: &Path) {
        debug!("Tracking partial output: {}", path.display());
        self.state().partial_outputs.insert(path.to_path_buf());
    }

    pub fn unregister_partial_output(&self, path: &Path) {
        self.state().partial_outputs.remove(path);
    }

    /// Tracks a running external process until the returned guard is dropped.
    pub fn track_process(&self, pid: u32) -> ProcessRegistration<'_> {
        debug!("Tracking external process {pid}");
        self.state().processes.insert(pid);
        ProcessRegistration { tracker: self, pid }
    }

    /// Snapshot of the tracked process ids.
    pub fn tracked_processes(&self) -> Vec<u32> {
        self.state().processes.iter().copied().collect()
    }

    /// Kills every tracked process and waits for it to exit.
    ///
    /// Once this returns, none of them can create or write a file any more.
    /// Returns the number of processes stopped.
    pub fn terminate_processes(&self) -> usize {
        let pids = std::mem::take(&mut self.state().processes);
        for pid in &pids {
            terminate_process(*pid);
        }
        pids.len()
    }

    /// Snapshot of the tracked temp files.
    pub fn tracked_temp_files(&self) -> Vec<PathBuf> {
        self.state().temp_files.iter().cloned().collect()
    }

    /// Snapshot of the tracked partial outputs.
    pub fn tracked_partial_outputs(&self) -> Vec<PathBuf> {
        self.state().partial_outputs.iter().cloned().collect()
    }

    pub fn is_cleanup_done(&self) -> bool {
        self.state().cleanup_done
    }

    /// Deletes one temp file and stops tracking it.
    pub fn discard_temp_file(&self, path: &Path) {
        remove_file_quietly(path);
        self.unregister_temp_file(path);
    }

    /// Deletes one partial output and stops tracking it.
    pub fn discard_partial_output(&self, path: &Path) {
        remove_file_quietly(path);
        self.unregister_partial_output(path);
    }

    /// Deletes every tracked artifact and clears both sets.
    ///
    /// Only the first call does any work; later calls return `false` without
    /// touching the filesystem, even if new paths were registered in between.
    /// Missing files are ignored and other deletion errors are logged.
    pub fn cleanup_temporary_artifacts(&self) -> bool {
        let mut state = self.state();
        if state.cleanup_done {
            return false;
        }
        state.cleanup_done = true;

        let temp_files = std::mem::take(&mut state.temp_files);
        let partial_outputs = std::mem::take(&mut state.partial_outputs);

        for path in temp_files.iter().chain(partial_outputs.iter()) {
            remove_file_quietly(path);
        }

        if !temp_files.is_empty() || !partial_outputs.is_empty() {
            debug!(
                "Cleaned up {} temp file(s) and {} partial output(s)",
                temp_files.len(),
                partial_outputs.len()
            );
        }
        true
    }

    /// Marks a shutdown signal as handled. Returns `true` for the first caller only.
    pub(crate) fn mark_signal_handled(&self) -> bool {
        let mut state = self.state();
        if state.signal_handled {
            false
        } else {
            state.signal_handled = true;
            true
        }
    }

    pub fn is_signal_handled(&self) -> bool {
        self.state().signal_handled
    }
}

/// Keeps a process id in the tracker while the process runs.
#[derive(Debug)]
pub struct ProcessRegistration<'a> {
    tracker: &'a ArtifactTracker,
    pid: u32,
}

impl Drop for ProcessRegistration<'_> {
    fn drop(&mut self) {
        self.tracker.state().processes.remove(&self.pid);
    }
}

#[cfg(unix)]
fn terminate_process(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::sys::wait::waitpid;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!("Ignoring out-of-range process id {pid}");
        return;
    };
    let pid = Pid::from_raw(raw);

    match kill(pid, Signal::SIGKILL) {
        Ok(()) => {}
        Err(Errno::ESRCH) => return,
        Err(e) => {
            warn!("Failed to stop process {pid}: {e}");
            return;
        }
    }
    match waitpid(pid, None) {
        // ECHILD: the main thread reaped it first.
        Ok(_) | Err(Errno::ECHILD) => debug!("Stopped external process {pid}"),
        Err(e) => warn!("Failed to wait for process {pid}: {e}"),
    }
}

#[cfg(not(unix))]
fn terminate_process(pid: u32) {
    warn!("Cannot stop external process {pid} on this platform");
}

/// Removes `path`, treating "already gone" as success and logging anything else.
pub fn remove_file_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_registration_is_idempotent() {
        let tracker = ArtifactTracker::new();
        let path = Path::new("/tmp/concat.txt");

        tracker.register_temp_file(path);
        tracker.register_temp_file(path);
        assert_eq!(tracker.tracked_temp_files(), vec![path.to_path_buf()]);

        tracker.unregister_temp_file(path);
        tracker.unregister_temp_file(path);
        assert!(tracker.tracked_temp_files().is_empty());
    }

    #[test]
    fn test_cleanup_removes_tracked_files() {
        let dir = tempdir().unwrap();
        let temp_file = dir.path().join("concat.txt");
        let partial_file = dir.path().join("output.mp4.partial");
        std::fs::write(&temp_file, "temp").unwrap();
        std::fs::write(&partial_file, "temp").unwrap();

        let tracker = ArtifactTracker::new();
        tracker.register_temp_file(&temp_file);
        tracker.register_partial_output(&partial_file);

        assert!(tracker.cleanup_temporary_artifacts());

        assert!(!temp_file.exists());
        assert!(!partial_file.exists());
        assert!(tracker.tracked_temp_files().is_empty());
        assert!(tracker.tracked_partial_outputs().is_empty());
        assert!(tracker.is_cleanup_done());
    }

    #[test]
    fn test_cleanup_runs_only_once() {
        let dir = tempdir().unwrap();
        let tracker = ArtifactTracker::new();
        assert!(tracker.cleanup_temporary_artifacts());

        // Registered after the first cleanup: the one-shot flag wins over set contents.
        let late_file = dir.path().join("late.txt");
        std::fs::write(&late_file, "late").unwrap();
        tracker.register_temp_file(&late_file);

        assert!(!tracker.cleanup_temporary_artifacts());
        assert!(late_file.exists());
        assert_eq!(tracker.tracked_temp_files(), vec![late_file]);
    }

    #[test]
    fn test_cleanup_ignores_missing_files() {
        let dir = tempdir().unwrap();
        let tracker = ArtifactTracker::new();
        tracker.register_partial_output(&dir.path().join("never_created.mp4.partial"));

        assert!(tracker.cleanup_temporary_artifacts());
        assert!(tracker.tracked_partial_outputs().is_empty());
    }

    #[test]
    fn test_discard_partial_output() {
        let dir = tempdir().unwrap();
        let partial = dir.path().join("clip.mp4.partial");
        std::fs::write(&partial, "partial").unwrap();

        let tracker = ArtifactTracker::new();
        tracker.register_partial_output(&partial);
        tracker.discard_partial_output(&partial);

        assert!(!partial.exists());
        assert!(tracker.tracked_partial_outputs().is_empty());
        assert!(!tracker.is_cleanup_done());
    }

    #[test]
    fn test_signal_handled_flag_is_one_shot() {
        let tracker = ArtifactTracker::new();
        assert!(!tracker.is_signal_handled());
        assert!(tracker.mark_signal_handled());
        assert!(!tracker.mark_signal_handled());
        assert!(tracker.is_signal_handled());
    }

    #[test]
    fn test_process_registration_ends_with_guard() {
        let tracker = ArtifactTracker::new();
        {
            let _running = tracker.track_process(4242);
            assert_eq!(tracker.tracked_processes(), vec![4242]);
        }
        assert!(tracker.tracked_processes().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_terminate_processes_kills_and_reaps_child() {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        let tracker = ArtifactTracker::new();
        let _running = tracker.track_process(pid);

        assert_eq!(tracker.terminate_processes(), 1);

        // Reaped as well as killed, so the pid no longer exists.
        assert_eq!(kill(Pid::from_raw(pid as i32), None), Err(Errno::ESRCH));
        assert!(tracker.tracked_processes().is_empty());
    }
}
