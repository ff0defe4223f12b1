//! Configuration structures and constants for the seqpress-core library.
//!
//! This module holds the knobs the orchestrator consumes: where the clips
//! live, which encoder profile to use, how the target bitrate is bounded, and
//! whether to re-encode or resume.

mod builder;

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default output codec name.
pub const DEFAULT_CODEC: &str = "h265";

/// Default accelerator name.
pub const DEFAULT_ACCELERATOR: &str = "qsv";

/// Default ceiling for the target bitrate, in megabits.
pub const DEFAULT_MBITS_MAX: u32 = 25;

/// Default ceiling for the target bitrate as a fraction of the source bitrate.
pub const DEFAULT_RATIO_MAX: f64 = 0.70;

/// Default multiplier applied to `height * width * framerate` for resolutions
/// without a tuned preset.
pub const DEFAULT_BITRATE_MODIFIER: f64 = 0.12;

/// Output codec requested by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    H265,
    H264,
}

/// Hardware (or software) path used for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accelerator {
    Qsv,
    Cpu,
}

/// A resolved codec/accelerator pair with its fixed ffmpeg options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderProfile {
    pub codec: Codec,
    pub accelerator: Accelerator,
}

impl EncoderProfile {
    /// Resolves codec and accelerator names into a profile.
    ///
    /// Names are matched case-insensitively. An unknown name on either side is
    /// a configuration error.
    pub fn from_names(codec: &str, accelerator: &str) -> CoreResult<Self> {
        let codec_parsed = match codec.to_ascii_lowercase().as_str() {
            "h265" | "hevc" => Some(Codec::H265),
            "h264" | "avc" => Some(Codec::H264),
            _ => None,
        };
        let accelerator_parsed = match accelerator.to_ascii_lowercase().as_str() {
            "qsv" => Some(Accelerator::Qsv),
            "cpu" => Some(Accelerator::Cpu),
            _ => None,
        };

        match (codec_parsed, accelerator_parsed) {
            (Some(codec), Some(accelerator)) => Ok(Self { codec, accelerator }),
            _ => Err(CoreError::Config(format!(
                "Unsupported codec/accelerator combination: {codec}/{accelerator}"
            ))),
        }
    }

    /// The encoder options placed between the input and the rate control
    /// arguments of a re-encode.
    pub fn encoder_args(&self) -> &'static [&'static str] {
        match (self.accelerator, self.codec) {
            (Accelerator::Qsv, Codec::H265) => &[
                "-init_hw_device", "qsv=hw", "-c", "copy", "-c:v", "hevc_qsv", "-extbrc", "1",
                "-refs", "20", "-bf", "7",
            ],
            (Accelerator::Qsv, Codec::H264) => {
                &["-init_hw_device", "qsv=hw", "-c", "copy", "-c:v", "h264_qsv"]
            }
            (Accelerator::Cpu, Codec::H265) => &["-c", "copy", "-c:v", "libx265"],
            (Accelerator::Cpu, Codec::H264) => &["-c", "copy", "-c:v", "libx264"],
        }
    }
}

impl fmt::Display for EncoderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codec = match self.codec {
            Codec::H265 => "h265",
            Codec::H264 => "h264",
        };
        let accelerator = match self.accelerator {
            Accelerator::Qsv => "qsv",
            Accelerator::Cpu => "cpu",
        };
        write!(f, "{codec}/{accelerator}")
    }
}

/// Main configuration structure for the seqpress-core library.
///
/// Built by the CLI (or by tests through [`CoreConfigBuilder`]) and handed to
/// [`crate::convert_sequences`]. Codec and accelerator stay as names until
/// [`CoreConfig::validate`] resolves them, so an unknown combination surfaces
/// as a configuration error before any sequence is touched.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Root directory holding the clips (flat before organizing, one
    /// subdirectory per sequence afterwards). Outputs are written here.
    pub videos_dir: PathBuf,

    /// Optional directory for concat lists (defaults to the system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// Codec name ("h265" or "h264")
    pub codec: String,

    /// Accelerator name ("qsv" or "cpu")
    pub accelerator: String,

    /// Multiplier for the formula branch of the bitrate selector
    pub bitrate_modifier: f64,

    /// Absolute bitrate ceiling in megabits
    pub mbits_max: u32,

    /// Bitrate ceiling as a fraction of the source bitrate
    pub ratio_max: f64,

    /// Re-encode when true, lossless stream copy when false
    pub convert: bool,

    /// Skip sequences whose final output already exists
    pub resume: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            videos_dir: PathBuf::from("."),
            temp_dir: None,
            codec: DEFAULT_CODEC.to_string(),
            accelerator: DEFAULT_ACCELERATOR.to_string(),
            bitrate_modifier: DEFAULT_BITRATE_MODIFIER,
            mbits_max: DEFAULT_MBITS_MAX,
            ratio_max: DEFAULT_RATIO_MAX,
            convert: true,
            resume: false,
        }
    }
}

impl CoreConfig {
    /// Creates a configuration for `videos_dir` with every other field at its default.
    pub fn new(videos_dir: PathBuf) -> Self {
        Self {
            videos_dir,
            ..Self::default()
        }
    }

    /// Validates the configuration and resolves the encoder profile.
    pub fn validate(&self) -> CoreResult<EncoderProfile> {
        let profile = EncoderProfile::from_names(&self.codec, &self.accelerator)?;

        if !self.bitrate_modifier.is_finite() || self.bitrate_modifier <= 0.0 {
            return Err(CoreError::Config(format!(
                "bitrate modifier must be positive, got {}",
                self.bitrate_modifier
            )));
        }

        if !self.ratio_max.is_finite() || self.ratio_max <= 0.0 || self.ratio_max > 1.0 {
            return Err(CoreError::Config(format!(
                "ratio max must be within (0, 1], got {}",
                self.ratio_max
            )));
        }

        if self.mbits_max == 0 {
            return Err(CoreError::Config("mbits max must be greater than 0".to_string()));
        }

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_resolve_case_insensitively() {
        let profile = EncoderProfile::from_names("H265", "QSV").unwrap();
        assert_eq!(profile.codec, Codec::H265);
        assert_eq!(profile.accelerator, Accelerator::Qsv);
        assert_eq!(profile.to_string(), "h265/qsv");
    }

    #[test]
    fn test_profile_encoder_args() {
        let cpu_h264 = EncoderProfile::from_names("h264", "cpu").unwrap();
        assert_eq!(cpu_h264.encoder_args(), &["-c", "copy", "-c:v", "libx264"]);

        let qsv_h265 = EncoderProfile::from_names("h265", "qsv").unwrap();
        assert!(qsv_h265.encoder_args().contains(&"hevc_qsv"));
        assert!(qsv_h265.encoder_args().contains(&"-extbrc"));
    }

    #[test]
    fn test_unknown_combination_is_config_error() {
        let err = EncoderProfile::from_names("bad", "cpu").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(err.to_string().contains("Unsupported codec/accelerator"));

        let err = EncoderProfile::from_names("h264", "cuda").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_out_of_range_knobs() {
        let mut config = CoreConfig::default();
        assert!(config.validate().is_ok());

        config.ratio_max = 1.5;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.ratio_max = 0.7;
        config.bitrate_modifier = 0.0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.bitrate_modifier = 0.12;
        config.mbits_max = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
