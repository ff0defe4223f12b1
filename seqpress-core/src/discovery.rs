//! Directory listing helpers.
//!
//! Everything here returns names or paths in lexicographic order so that the
//! organizer and the orchestrator see the same, deterministic ordering on
//! every platform.

use crate::error::CoreResult;

use std::path::{Path, PathBuf};

/// Lists the names of every entry directly inside `root`, sorted.
///
/// Names that are not valid UTF-8 are skipped; camera clip names never are.
///
/// # Examples
///
/// ```rust,no_run
/// use seqpress_core::list_directory_entries;
/// use std::path::Path;
///
/// let entries = list_directory_entries(Path::new("/path/to/videos")).unwrap();
/// println!("{} entries", entries.len());
/// ```
pub fn list_directory_entries(root: &Path) -> CoreResult<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(root)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            entry.file_name().into_string().ok()
        })
        .collect();
    names.sort();
    Ok(names)
}

/// Lists the clip files of one sequence directory, sorted by file name.
///
/// Subdirectories and hidden files are not clips and are left out.
pub fn list_sequence_clips(sequence_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut clips: Vec<PathBuf> = std::fs::read_dir(sequence_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() {
                return None;
            }
            let hidden = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_none_or(|name| name.starts_with('.'));
            (!hidden).then_some(path)
        })
        .collect();
    clips.sort();
    Ok(clips)
}

/// Lists the sequence subdirectories already present under `root`, sorted.
///
/// Used when organizing is skipped. Directories named in `exclude` (for
/// example the log directory) and hidden directories are left out.
pub fn list_sequence_dirs(root: &Path, exclude: &[&Path]) -> CoreResult<Vec<String>> {
    let mut sequences: Vec<String> = std::fs::read_dir(root)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_dir() || exclude.iter().any(|excluded| *excluded == path) {
                return None;
            }
            let name = path.file_name()?.to_str()?.to_string();
            (!name.starts_with('.')).then_some(name)
        })
        .collect();
    sequences.sort();
    Ok(sequences)
}
