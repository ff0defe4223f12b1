// ============================================================================
// seqpress-core/src/external/ffmpeg.rs
// ============================================================================
//
// FFMPEG INVOCATION: Concat + Transcode Argument Building
//
// Builds the single ffmpeg invocation that reads a sequence's concat list and
// writes the partial output. The argument order is fixed:
//
//   -y -f concat -safe 0 -i <list>
//   <encoder block>                 (profile options + rate control, or -c copy)
//   -map 0:<i> ...                  (one per mapped stream)
//   -f <container> <partial output>
//
// The container is named explicitly because the partial output's extension
// is the reserved suffix, which ffmpeg cannot map to a muxer.
//
// AI-ASSISTANT-INFO: ffmpeg command construction for sequence conversion

use crate::config::EncoderProfile;

use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::{Path, PathBuf};

/// GOP length used for every re-encode.
pub const GOP_SIZE: u32 = 120;

/// Encoder preset used for every re-encode.
pub const ENCODER_PRESET: &str = "slower";

/// Container used when the destination extension is not recognized.
pub const DEFAULT_CONTAINER: &str = "mp4";

/// How the video stream is written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodeMode {
    /// Re-encode with the given profile at `bitrate` bits per second.
    Convert { profile: EncoderProfile, bitrate: u64 },
    /// Stream copy, no re-encode.
    Copy,
}

/// Parameters for one concat + transcode invocation.
#[derive(Debug, Clone)]
pub struct TranscodeParams {
    pub concat_list: PathBuf,
    /// Where ffmpeg writes; always the partial path, never the destination.
    pub output_path: PathBuf,
    /// Muxer name passed with `-f`.
    pub container: String,
    pub mode: EncodeMode,
    /// Input stream indices to map, in order.
    pub stream_maps: Vec<usize>,
}

/// Picks the muxer for a destination path from its extension.
pub fn container_format(destination: &Path) -> &'static str {
    match destination.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("mov") => "mov",
        _ => DEFAULT_CONTAINER,
    }
}

/// Builds the ffmpeg argument vector for `params`.
pub fn build_transcode_args(params: &TranscodeParams) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.push(params.concat_list.to_string_lossy().into_owned());

    match params.mode {
        EncodeMode::Convert { profile, bitrate } => {
            args.extend(profile.encoder_args().iter().map(|s| s.to_string()));

            let maxrate = (bitrate as f64 * 1.5).round() as u64;
            let bufsize = bitrate.saturating_mul(4);
            args.extend([
                "-b:v".to_string(),
                bitrate.to_string(),
                "-maxrate".to_string(),
                maxrate.to_string(),
                "-bitrate_limit".to_string(),
                "0".to_string(),
                "-bufsize".to_string(),
                bufsize.to_string(),
                "-fps_mode".to_string(),
                "passthrough".to_string(),
                "-g".to_string(),
                GOP_SIZE.to_string(),
                "-preset".to_string(),
                ENCODER_PRESET.to_string(),
                "-look_ahead".to_string(),
                "1".to_string(),
            ]);
        }
        EncodeMode::Copy => {
            args.push("-c".to_string());
            args.push("copy".to_string());
        }
    }

    for index in &params.stream_maps {
        args.push("-map".to_string());
        args.push(format!("0:{index}"));
    }

    args.push("-f".to_string());
    args.push(params.container.clone());
    args.push(params.output_path.to_string_lossy().into_owned());
    args
}

/// Builds the ffmpeg command for `params`.
pub fn build_transcode_command(params: &TranscodeParams) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(build_transcode_args(params));
    cmd
}
