// ============================================================================
// seqpress-core/src/processing/bitrate.rs
// ============================================================================
//
// BITRATE SELECTION: Target Bitrate from Probed Stream Metadata
//
// Pure decision function: the first stream's coded size, framerate and bit
// rate go in, a bounded target bitrate (bits per second) comes out.
//
//   1. Tuned tier for 1080/1520/2160 lines, otherwise
//      round(height * width * framerate * modifier)
//   2. Capped at round(source bit rate * ratio_max)
//   3. Capped at mbits_max * 1024 * 1024
//
// AI-ASSISTANT-INFO: Bitrate selector, no I/O

use crate::error::{CoreError, CoreResult};
use crate::media::{StreamDescriptor, StreamSet};

use std::path::Path;
use std::str::FromStr;

/// Pre-tuned bitrates for common coded heights.
pub const BITRATE_TIERS: &[(u32, u64)] = &[
    (1080, 14_680_064),
    (1520, 18_874_368),
    (2160, 23_068_672),
];

const BITS_PER_MEGABIT: u64 = 1024 * 1024;

/// The parsed numeric fields of a stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetrics {
    pub coded_height: u32,
    pub coded_width: u32,
    pub framerate: f64,
    pub bit_rate: u64,
}

impl VideoMetrics {
    /// Extracts and parses the four numeric fields of `stream`.
    ///
    /// Fields are checked in the order height, width, framerate, bit rate;
    /// the first absent one is `MissingMetadata`, the first unparseable one is
    /// `InvalidField`, both naming the field.
    pub fn from_stream(stream: &StreamDescriptor, path: &Path) -> CoreResult<Self> {
        let coded_height = parse_field(path, "coded_height", stream.coded_height.as_deref())?;
        let coded_width = parse_field(path, "coded_width", stream.coded_width.as_deref())?;

        let raw_framerate = require(path, "framerate", stream.framerate.as_deref())?;
        let framerate = parse_framerate(raw_framerate).ok_or_else(|| CoreError::InvalidField {
            path: path.to_path_buf(),
            field: "framerate",
            value: raw_framerate.to_string(),
        })?;

        let bit_rate = parse_field(path, "bit_rate", stream.bit_rate.as_deref())?;

        Ok(Self {
            coded_height,
            coded_width,
            framerate,
            bit_rate,
        })
    }
}

fn require<'a>(path: &Path, field: &'static str, value: Option<&'a str>) -> CoreResult<&'a str> {
    value.ok_or_else(|| CoreError::MissingMetadata {
        path: path.to_path_buf(),
        field,
    })
}

fn parse_field<T: FromStr>(path: &Path, field: &'static str, value: Option<&str>) -> CoreResult<T> {
    let raw = require(path, field, value)?;
    raw.trim().parse::<T>().map_err(|_| CoreError::InvalidField {
        path: path.to_path_buf(),
        field,
        value: raw.to_string(),
    })
}

/// Parses a framerate given as a decimal ("29.97") or a ratio ("30000/1001").
///
/// Returns `None` for anything that is not a finite, positive rate.
pub fn parse_framerate(raw: &str) -> Option<f64> {
    let rate = match raw.trim().split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => raw.trim().parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Bitrate before clamping: the tuned tier for the height, or the formula.
pub fn base_bitrate(metrics: &VideoMetrics, modifier: f64) -> u64 {
    BITRATE_TIERS
        .iter()
        .find(|(height, _)| *height == metrics.coded_height)
        .map(|(_, bitrate)| *bitrate)
        .unwrap_or_else(|| {
            let pixels_per_second = f64::from(metrics.coded_height)
                * f64::from(metrics.coded_width)
                * metrics.framerate;
            (pixels_per_second * modifier).round() as u64
        })
}

/// Computes the target bitrate for a sequence from its first stream.
///
/// # Errors
///
/// * `CoreError::NoStreams` - If `streams` is empty
/// * `CoreError::MissingMetadata` / `CoreError::InvalidField` - See [`VideoMetrics::from_stream`]
///
/// # Examples
///
/// ```rust
/// use seqpress_core::media::{StreamDescriptor, StreamSet};
/// use seqpress_core::processing::bitrate::select_bitrate;
///
/// let streams = StreamSet::new(
///     "GH010001.MP4",
///     vec![StreamDescriptor::video("hevc", 1920, 1080, "30", 1_000_000)],
/// );
/// assert_eq!(select_bitrate(&streams, 0.12, 25, 0.7).unwrap(), 700_000);
/// ```
pub fn select_bitrate(
    streams: &StreamSet,
    modifier: f64,
    mbits_max: u32,
    ratio_max: f64,
) -> CoreResult<u64> {
    let first = streams
        .get(0)
        .ok_or_else(|| CoreError::NoStreams(streams.source().to_path_buf()))?;
    let metrics = VideoMetrics::from_stream(first, streams.source())?;

    let base = base_bitrate(&metrics, modifier);
    let ratio_cap = (metrics.bit_rate as f64 * ratio_max).round() as u64;
    let absolute_cap = u64::from(mbits_max) * BITS_PER_MEGABIT;
    let bitrate = base.min(ratio_cap).min(absolute_cap);

    log::debug!(
        "Bitrate for {}: base={} ratio_cap={} absolute_cap={} -> {}",
        streams.source().display(),
        base,
        ratio_cap,
        absolute_cap,
        bitrate
    );
    Ok(bitrate)
}
