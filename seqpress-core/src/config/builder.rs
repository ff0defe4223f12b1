// ============================================================================
// seqpress-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// This module implements the builder pattern for the CoreConfig structure,
// providing a fluent API for creating CoreConfig instances with defaults for
// every field except the videos directory.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CoreConfig

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::error::{CoreError, CoreResult};

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use seqpress_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .videos_dir(PathBuf::from("/path/to/videos"))
///     .codec("h264")
///     .accelerator("cpu")
///     .mbits_max(20)
///     .resume(true)
///     .build()
///     .unwrap();
///
/// assert!(config.resume);
/// assert_eq!(config.mbits_max, 20);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfigBuilder {
    // Required fields
    videos_dir: Option<PathBuf>,

    // Optional fields with defaults
    temp_dir: Option<PathBuf>,
    codec: String,
    accelerator: String,
    bitrate_modifier: f64,
    mbits_max: u32,
    ratio_max: f64,
    convert: bool,
    resume: bool,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self {
            videos_dir: None,
            temp_dir: None,
            codec: super::DEFAULT_CODEC.to_string(),
            accelerator: super::DEFAULT_ACCELERATOR.to_string(),
            bitrate_modifier: super::DEFAULT_BITRATE_MODIFIER,
            mbits_max: super::DEFAULT_MBITS_MAX,
            ratio_max: super::DEFAULT_RATIO_MAX,
            convert: true,
            resume: false,
        }
    }

    /// Sets the root videos directory.
    pub fn videos_dir(mut self, videos_dir: PathBuf) -> Self {
        self.videos_dir = Some(videos_dir);
        self
    }

    /// Sets the directory used for concat lists.
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = Some(temp_dir);
        self
    }

    /// Sets the codec name.
    pub fn codec(mut self, codec: &str) -> Self {
        self.codec = codec.to_string();
        self
    }

    /// Sets the accelerator name.
    pub fn accelerator(mut self, accelerator: &str) -> Self {
        self.accelerator = accelerator.to_string();
        self
    }

    /// Sets the multiplier used for resolutions without a tuned preset.
    pub fn bitrate_modifier(mut self, modifier: f64) -> Self {
        self.bitrate_modifier = modifier;
        self
    }

    /// Sets the absolute bitrate ceiling in megabits.
    pub fn mbits_max(mut self, mbits: u32) -> Self {
        self.mbits_max = mbits;
        self
    }

    /// Sets the bitrate ceiling relative to the source bitrate.
    pub fn ratio_max(mut self, ratio: f64) -> Self {
        self.ratio_max = ratio;
        self
    }

    /// Enables or disables re-encoding. Disabled means lossless stream copy.
    pub fn convert(mut self, convert: bool) -> Self {
        self.convert = convert;
        self
    }

    /// Enables or disables resume mode.
    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Builds a CoreConfig instance from the builder.
    ///
    /// # Errors
    ///
    /// * `CoreError::Config` - If the videos directory was never set
    pub fn build(self) -> CoreResult<CoreConfig> {
        let videos_dir = self
            .videos_dir
            .ok_or_else(|| CoreError::Config("videos_dir is required".to_string()))?;

        Ok(CoreConfig {
            videos_dir,
            temp_dir: self.temp_dir,
            codec: self.codec,
            accelerator: self.accelerator,
            bitrate_modifier: self.bitrate_modifier,
            mbits_max: self.mbits_max,
            ratio_max: self.ratio_max,
            convert: self.convert,
            resume: self.resume,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MBITS_MAX, DEFAULT_RATIO_MAX};

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfigBuilder::new()
            .videos_dir(PathBuf::from("/videos"))
            .build()
            .unwrap();

        assert_eq!(config.videos_dir, PathBuf::from("/videos"));
        assert_eq!(config.codec, "h265");
        assert_eq!(config.accelerator, "qsv");
        assert_eq!(config.mbits_max, DEFAULT_MBITS_MAX);
        assert_eq!(config.ratio_max, DEFAULT_RATIO_MAX);
        assert!(config.convert);
        assert!(!config.resume);
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn test_builder_requires_videos_dir() {
        let result = CoreConfigBuilder::new().codec("h264").build();
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
