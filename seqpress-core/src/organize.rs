// ============================================================================
// seqpress-core/src/organize.rs
// ============================================================================
//
// FILE ORGANIZER: Grouping Clips into Sequence Directories
//
// Cameras split one recording into several chapter files. GoPro names them
// `GH<chapter:2><sequence:4>.MP4` (or `GX...` for HEVC recordings), so every
// chapter of a recording shares the characters after the 4-character prefix.
// This module derives that sequence key from each clip name and moves the
// clips of each sequence into `root/<key>/`.
//
// KEY COMPONENTS:
// - sequence_key: Filename -> sequence key derivation
// - organize_into_sequences: Creates the subdirectories and moves the clips
//
// AI-ASSISTANT-INFO: Flat clip listing -> per-sequence subdirectories

use crate::error::{CoreError, CoreResult};

use log::{debug, info, warn};
use std::path::Path;

/// File name prefixes of cameras that encode the chapter number in the name.
pub const VENDOR_PREFIXES: &[&str] = &["GH", "GX"];

/// Length of the vendor prefix plus chapter number stripped from the key.
pub const VENDOR_PREFIX_LEN: usize = 4;

/// Clip extension recognized as video (compared case-insensitively).
pub const VIDEO_EXTENSION: &str = "mp4";

/// Returns `true` if `name` has the video extension, in any case.
pub fn is_video_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(VIDEO_EXTENSION))
}

/// Derives the sequence key of a clip file name.
///
/// With a recognized vendor prefix the key is the stem after the first
/// [`VENDOR_PREFIX_LEN`] characters (`GH010001.MP4` -> `0001`); otherwise it
/// is the whole stem (`holiday.mp4` -> `holiday`).
pub fn sequence_key(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name);

    let has_vendor_prefix = VENDOR_PREFIXES.iter().any(|prefix| stem.starts_with(prefix));
    match stem.get(VENDOR_PREFIX_LEN..) {
        Some(rest) if has_vendor_prefix && !rest.is_empty() => rest.to_string(),
        _ => stem.to_string(),
    }
}

/// Moves the video files among `entries` into one subdirectory per sequence.
///
/// `entries` are names inside `root`. Non-video entries are ignored. Returns
/// the distinct sequence keys in the order they were first seen; with no video
/// files the result is empty and nothing on disk changes.
///
/// A file whose name already exists in its sequence directory is left in
/// place: converted outputs are named after the sequence's first clip, so on a
/// later run it is a finished output, not a new clip. Its key is still
/// returned.
///
/// A failure to create a directory or move a file stops the run with
/// `CoreError::OrganizeFailed`. Files already moved stay where they are.
pub fn organize_into_sequences(entries: &[String], root: &Path) -> CoreResult<Vec<String>> {
    let files: Vec<&String> = entries.iter().filter(|name| is_video_file(name)).collect();
    if files.is_empty() {
        info!("No video files to organize in {}", root.display());
        return Ok(Vec::new());
    }

    let keyed: Vec<(&String, String)> = files.iter().map(|name| (*name, sequence_key(name))).collect();

    let mut sequences: Vec<String> = Vec::new();
    for (_, key) in &keyed {
        if !sequences.contains(key) {
            sequences.push(key.clone());
        }
    }

    info!(
        "Organizing {} video file(s) into {} sequence(s)",
        files.len(),
        sequences.len()
    );

    let organize_error = |source: std::io::Error| CoreError::OrganizeFailed {
        root: root.to_path_buf(),
        source,
    };

    for sequence in &sequences {
        std::fs::create_dir_all(root.join(sequence)).map_err(organize_error)?;
    }

    for (name, key) in &keyed {
        let from = root.join(name.as_str());
        let to = root.join(key).join(name.as_str());
        if to.exists() {
            warn!(
                "{} already exists, leaving {} in place",
                to.display(),
                from.display()
            );
            continue;
        }
        debug!("Moving {} -> {}", from.display(), to.display());
        std::fs::rename(&from, &to).map_err(organize_error)?;
    }

    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_key_strips_vendor_prefix() {
        assert_eq!(sequence_key("GH010001.MP4"), "0001");
        assert_eq!(sequence_key("GH020001.MP4"), "0001");
        assert_eq!(sequence_key("GX011234.mp4"), "1234");
    }

    #[test]
    fn test_sequence_key_without_prefix_uses_stem() {
        assert_eq!(sequence_key("holiday.mp4"), "holiday");
        assert_eq!(sequence_key("DJI_0001.MP4"), "DJI_0001");
    }

    #[test]
    fn test_sequence_key_short_prefixed_name_keeps_stem() {
        assert_eq!(sequence_key("GH01.MP4"), "GH01");
    }

    #[test]
    fn test_is_video_file_case_insensitive() {
        assert!(is_video_file("GH010001.MP4"));
        assert!(is_video_file("clip.mp4"));
        assert!(is_video_file("clip.Mp4"));
        assert!(!is_video_file("other.txt"));
        assert!(!is_video_file("GH010001.THM"));
        assert!(!is_video_file("mp4"));
    }
}
