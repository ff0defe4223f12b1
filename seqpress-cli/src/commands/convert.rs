//! Implementation of the 'convert' subcommand.
//!
//! Checks the external tools, builds the core configuration from the
//! arguments, obtains the sequence list (by organizing the clips or from the
//! existing subdirectories) and hands it to the core orchestrator.

use crate::cli::ConvertArgs;
use crate::error::{CliErrorContext, CliResult};

use seqpress_core::{
    ArtifactTracker, CoreConfig, CoreConfigBuilder, CoreError, SequenceOutcome, Toolchain,
    calculate_size_reduction, check_dependency, convert_sequences, format_bytes, format_elapsed,
    list_directory_entries, list_sequence_clips, list_sequence_dirs, organize_into_sequences,
};
use seqpress_core::organize::is_video_file;

use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// External tools the conversion cannot run without, with their version flag.
const REQUIRED_TOOLS: &[(&str, &str)] = &[("ffmpeg", "-version"), ("ffprobe", "-version"), ("exiftool", "-ver")];

/// Needed only for sequences with a telemetry track.
const TELEMETRY_TOOL: (&str, &str) = ("udtacopy", "-h");

/// Resolves the videos directory to an absolute, existing directory.
pub fn resolve_videos_dir(path: &Path) -> CliResult<PathBuf> {
    let resolved = path.canonicalize().map_err(|e| {
        CoreError::PathError(format!("Invalid videos directory '{}': {}", path.display(), e))
    })?;
    if !resolved.is_dir() {
        return Err(CoreError::PathError(format!(
            "Videos path '{}' is not a directory",
            resolved.display()
        )));
    }
    Ok(resolved)
}

/// Builds and validates the core configuration from the arguments.
pub fn create_core_config(args: &ConvertArgs, videos_dir: PathBuf) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .videos_dir(videos_dir)
        .codec(&args.codec)
        .accelerator(&args.accelerator)
        .bitrate_modifier(args.bitrate_modifier)
        .mbits_max(args.mbits_max)
        .ratio_max(args.ratio_max)
        .convert(!args.no_convert)
        .resume(args.resume);
    if let Some(temp_dir) = &args.temp_dir {
        builder = builder.temp_dir(temp_dir.clone());
    }

    let config = builder.build()?;
    config.validate()?;
    Ok(config)
}

/// Fails if a required tool is missing; only warns for the telemetry copier.
pub fn check_dependencies() -> CliResult<()> {
    for (tool, version_arg) in REQUIRED_TOOLS {
        check_dependency(tool, version_arg)?;
    }

    let (tool, version_arg) = TELEMETRY_TOOL;
    if check_dependency(tool, version_arg).is_err() {
        warn!("{tool} not found: sequences with a telemetry track will fail");
    }
    Ok(())
}

/// Returns the sequence keys to convert.
///
/// After organizing, sequence directories left by an earlier run that still
/// hold clips are appended in name order, so a resumed batch reaches the
/// sequences that run never finished.
pub fn collect_sequences(args: &ConvertArgs, videos_dir: &Path, log_dir: &Path) -> CliResult<Vec<String>> {
    let existing = list_sequence_dirs(videos_dir, &[log_dir])
        .cli_with_context(|| format!("Failed to list sequences in {}", videos_dir.display()))?;
    if args.skip_organize {
        info!("Skipping organization, using existing sequence directories");
        return Ok(existing);
    }

    let entries = list_directory_entries(videos_dir)
        .cli_with_context(|| format!("Failed to read {}", videos_dir.display()))?;
    let mut sequences = organize_into_sequences(&entries, videos_dir)?;

    for sequence in existing {
        if !sequences.contains(&sequence) && holds_clips(&videos_dir.join(&sequence))? {
            sequences.push(sequence);
        }
    }
    Ok(sequences)
}

fn holds_clips(dir: &Path) -> CliResult<bool> {
    let clips = list_sequence_clips(dir)
        .cli_with_context(|| format!("Failed to read {}", dir.display()))?;
    Ok(clips.iter().any(|clip| {
        clip.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_video_file)
    }))
}

/// Runs the conversion for already-resolved paths.
pub fn run_convert(
    args: &ConvertArgs,
    videos_dir: PathBuf,
    log_dir: &Path,
    tracker: &ArtifactTracker,
) -> CliResult<Vec<SequenceOutcome>> {
    let total_start_time = Instant::now();

    info!("Videos directory: {}", videos_dir.display());
    info!("Log directory: {}", log_dir.display());

    let config = create_core_config(args, videos_dir)?;
    check_dependencies()?;

    let sequences = collect_sequences(args, &config.videos_dir, log_dir)?;
    if sequences.is_empty() {
        info!("No sequences to process in {}", config.videos_dir.display());
        return Ok(Vec::new());
    }

    let outcomes = convert_sequences(&Toolchain::system(), tracker, &config, &sequences)?;
    print_summary(&outcomes, total_start_time);
    Ok(outcomes)
}

/// Logs a per-sequence summary and the totals.
pub fn print_summary(outcomes: &[SequenceOutcome], started: Instant) {
    let converted = outcomes.iter().filter(|o| !o.is_skipped()).count();
    let skipped = outcomes.len() - converted;

    for outcome in outcomes {
        match outcome {
            SequenceOutcome::Converted {
                sequence,
                destination,
                elapsed,
                input_size,
                output_size,
                ..
            } => {
                info!("Sequence {} -> {}", sequence, destination.display());
                info!("  Encode time: {}", format_elapsed(*elapsed));
                info!("  Input size:  {}", format_bytes(*input_size));
                info!("  Output size: {}", format_bytes(*output_size));
                info!(
                    "  Reduced by:  {}%",
                    calculate_size_reduction(*input_size, *output_size)
                );
            }
            SequenceOutcome::Skipped { sequence, destination } => {
                info!("Sequence {} skipped, {} exists", sequence, destination.display());
            }
        }
    }

    info!("Converted {converted} sequence(s), skipped {skipped}.");
    info!(
        "Total execution time: {}",
        format_elapsed(started.elapsed())
    );
}
