// ============================================================================
// seqpress-core/src/processing/sequence.rs
// ============================================================================
//
// SEQUENCE CONVERSION: Per-Sequence Orchestration
//
// Drives one output file per sequence through:
//
//   resume check -> partial prep -> probe -> layout + bitrate
//     -> concat list -> ffmpeg (to partial) -> metadata copy
//     -> rename partial to destination -> attribute copy
//
// ffmpeg and the copiers only ever write the partial path. The destination
// appears through a single rename, so it is either absent or complete. The
// job guard removes the concat list on every exit path and the partial output
// on every path except a successful rename.
//
// Sequences run one after another. The first error aborts the batch.
//
// AI-ASSISTANT-INFO: Crash-safe, resumable conversion orchestrator

// ---- Internal crate imports ----
use crate::SequenceOutcome;
use crate::artifacts::{ArtifactTracker, remove_file_quietly};
use crate::config::{CoreConfig, EncoderProfile};
use crate::discovery::list_sequence_clips;
use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg::{EncodeMode, TranscodeParams, build_transcode_command, container_format};
use crate::external::{FfmpegSpawner, FfprobeExecutor, MetadataCopier, Toolchain, run_ffmpeg};
use crate::media::probe_streams;
use crate::processing::bitrate::select_bitrate;
use crate::processing::concat::write_concat_list;
use crate::processing::layout::StreamLayout;
use crate::temp_files::{partial_output_path, temp_base_dir};
use crate::utils::{format_bitrate, get_file_size, get_filename_safe};

// ---- External crate imports ----
use log::{debug, info, warn};

// ---- Standard library imports ----
use std::fs::{File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

// ============================================================================
// BATCH
// ============================================================================

/// Converts every sequence in `sequences`, in order.
///
/// The configuration is validated first, so an unknown codec/accelerator pair
/// fails before any sequence is touched. Each sequence is read from
/// `config.videos_dir/<key>/` and written to `config.videos_dir/<first clip>`.
///
/// # Errors
///
/// Returns the first error raised by any sequence. Sequences finished before
/// it stay converted.
pub fn convert_sequences<P, S, T, G>(
    toolchain: &Toolchain<P, S, T, G>,
    tracker: &ArtifactTracker,
    config: &CoreConfig,
    sequences: &[String],
) -> CoreResult<Vec<SequenceOutcome>>
where
    P: FfprobeExecutor,
    S: FfmpegSpawner,
    T: MetadataCopier,
    G: MetadataCopier,
{
    let profile = config.validate()?;
    info!(
        "Processing {} sequence(s) in {} ({})",
        sequences.len(),
        config.videos_dir.display(),
        if config.convert {
            format!("re-encode with {profile}")
        } else {
            "stream copy".to_string()
        }
    );

    let mut outcomes = Vec::with_capacity(sequences.len());
    for (index, sequence) in sequences.iter().enumerate() {
        info!("Sequence {}/{}: {}", index + 1, sequences.len(), sequence);
        let outcome = convert_sequence(toolchain, tracker, config, profile, sequence)?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

// ============================================================================
// SINGLE SEQUENCE
// ============================================================================

/// Converts one sequence. See the module documentation for the stages.
pub fn convert_sequence<P, S, T, G>(
    toolchain: &Toolchain<P, S, T, G>,
    tracker: &ArtifactTracker,
    config: &CoreConfig,
    profile: EncoderProfile,
    sequence: &str,
) -> CoreResult<SequenceOutcome>
where
    P: FfprobeExecutor,
    S: FfmpegSpawner,
    T: MetadataCopier,
    G: MetadataCopier,
{
    let started = Instant::now();
    let root = config.videos_dir.as_path();
    let sequence_dir = root.join(sequence);

    let clips = list_sequence_clips(&sequence_dir)?;
    let source = clips
        .first()
        .cloned()
        .ok_or_else(|| CoreError::EmptySequence(sequence_dir.clone()))?;
    let destination = root.join(get_filename_safe(&source)?);

    // ---- Resume check ----
    if config.resume && destination.exists() {
        info!(
            "Skipping sequence {}: {} already exists",
            sequence,
            destination.display()
        );
        return Ok(SequenceOutcome::Skipped {
            sequence: sequence.to_string(),
            destination,
        });
    }

    // ---- Partial output preparation ----
    let partial = partial_output_path(&destination);
    if partial.exists() {
        warn!("Removing stale partial output {}", partial.display());
        remove_file_quietly(&partial);
    }
    tracker.register_partial_output(&partial);
    let mut job = JobArtifacts::new(tracker, partial.clone());

    // ---- Probe and validate ----
    let streams = probe_streams(&toolchain.prober, &source)?;
    let layout = StreamLayout::detect(sequence, &streams)?;
    let bitrate = select_bitrate(
        &streams,
        config.bitrate_modifier,
        config.mbits_max,
        config.ratio_max,
    )?;
    debug!(
        "Sequence {}: {} stream(s), layout {:?}, target {}",
        sequence,
        streams.len(),
        layout,
        format_bitrate(bitrate)
    );

    // ---- Concat list ----
    let concat_list = write_concat_list(tracker, &temp_base_dir(config), &clips)?;
    job.set_concat_list(concat_list.clone());

    // ---- Transcode into the partial path ----
    let mode = if config.convert {
        EncodeMode::Convert { profile, bitrate }
    } else {
        EncodeMode::Copy
    };
    let params = TranscodeParams {
        concat_list,
        output_path: partial.clone(),
        container: container_format(&destination).to_string(),
        mode,
        stream_maps: layout.stream_maps(),
    };
    info!(
        "Converting {} clip(s) of sequence {} -> {}",
        clips.len(),
        sequence,
        destination.display()
    );
    run_ffmpeg(
        &toolchain.spawner,
        tracker,
        build_transcode_command(&params),
        &format!("converting sequence {sequence}"),
    )?;

    // ---- Metadata ----
    if layout.has_telemetry() {
        toolchain.telemetry.copy_metadata(tracker, &source, &partial)?;
    }
    toolchain.tags.copy_metadata(tracker, &source, &partial)?;

    // ---- Finalize ----
    std::fs::rename(&partial, &destination).map_err(|source| CoreError::FinalizeFailed {
        partial: partial.clone(),
        destination: destination.clone(),
        source,
    })?;
    tracker.unregister_partial_output(&partial);
    job.complete();

    if let Err(e) = copy_file_attributes(&source, &destination) {
        warn!(
            "Could not copy permissions/timestamps from {} to {}: {}",
            source.display(),
            destination.display(),
            e
        );
    }

    let input_size = clips.iter().map(|clip| get_file_size(clip).unwrap_or(0)).sum();
    let output_size = get_file_size(&destination)?;
    let elapsed = started.elapsed();
    info!("Finished sequence {} in {:.1}s", sequence, elapsed.as_secs_f64());

    Ok(SequenceOutcome::Converted {
        sequence: sequence.to_string(),
        destination,
        bitrate: config.convert.then_some(bitrate),
        elapsed,
        input_size,
        output_size,
    })
}

/// Copies permission bits and access/modification times from `source` to `destination`.
pub fn copy_file_attributes(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = std::fs::metadata(source)?;

    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    File::options().write(true).open(destination)?.set_times(times)?;

    std::fs::set_permissions(destination, metadata.permissions())
}

// ============================================================================
// JOB GUARD
// ============================================================================

/// Removes a job's temporary artifacts when it goes out of scope.
///
/// The concat list is always removed. The partial output is removed unless
/// [`JobArtifacts::complete`] was called after the rename.
struct JobArtifacts<'a> {
    tracker: &'a ArtifactTracker,
    partial: PathBuf,
    concat_list: Option<PathBuf>,
    completed: bool,
}

impl<'a> JobArtifacts<'a> {
    fn new(tracker: &'a ArtifactTracker, partial: PathBuf) -> Self {
        Self {
            tracker,
            partial,
            concat_list: None,
            completed: false,
        }
    }

    fn set_concat_list(&mut self, path: PathBuf) {
        self.concat_list = Some(path);
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}

impl Drop for JobArtifacts<'_> {
    fn drop(&mut self) {
        if let Some(list) = self.concat_list.take() {
            self.tracker.discard_temp_file(&list);
        }
        if !self.completed {
            debug!("Discarding partial output {}", self.partial.display());
            self.tracker.discard_partial_output(&self.partial);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_job_guard_removes_partial_unless_completed() {
        let dir = tempdir().unwrap();
        let tracker = ArtifactTracker::new();

        let failed = dir.path().join("a.MP4.partial");
        std::fs::write(&failed, "half").unwrap();
        tracker.register_partial_output(&failed);
        drop(JobArtifacts::new(&tracker, failed.clone()));
        assert!(!failed.exists());
        assert!(tracker.tracked_partial_outputs().is_empty());

        let done = dir.path().join("b.MP4.partial");
        let list = dir.path().join("list.txt");
        std::fs::write(&done, "full").unwrap();
        std::fs::write(&list, "file 'x'").unwrap();
        tracker.register_temp_file(&list);
        {
            let mut job = JobArtifacts::new(&tracker, done.clone());
            job.set_concat_list(list.clone());
            job.complete();
        }
        assert!(done.exists());
        assert!(!list.exists());
        assert!(tracker.tracked_temp_files().is_empty());
    }

    #[test]
    fn test_copy_file_attributes_preserves_mtime() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src.mp4");
        let destination = dir.path().join("dst.mp4");
        std::fs::write(&source, "src").unwrap();
        std::fs::write(&destination, "dst").unwrap();

        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(old)
            .unwrap();

        copy_file_attributes(&source, &destination).unwrap();
        assert_eq!(std::fs::metadata(&destination).unwrap().modified().unwrap(), old);
    }
}
