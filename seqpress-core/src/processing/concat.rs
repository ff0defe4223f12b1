//! ffmpeg concat-demuxer list files.
//!
//! One `file '<path>'` line per clip, absolute paths, in sequence order.

use crate::artifacts::ArtifactTracker;
use crate::error::{CoreError, CoreResult};
use crate::temp_files::create_tracked_temp_file;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const CONCAT_LIST_PREFIX: &str = "seqpress_concat";

/// Quotes `path` for a concat list entry.
///
/// Inside single quotes ffmpeg takes everything literally, so a quote,
/// backslash or newline closes the quoted run, is backslash-escaped, and the
/// run is reopened: `it's` becomes `'it'\''s'`.
pub fn quote_concat_path(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('\'');
    for c in path.chars() {
        match c {
            '\'' | '\\' | '\n' => {
                quoted.push_str("'\\");
                quoted.push(c);
                quoted.push('\'');
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Formats the list content for `clips`; relative paths are made absolute.
pub fn format_concat_list(clips: &[PathBuf]) -> CoreResult<String> {
    let mut content = String::new();
    for clip in clips {
        let absolute = std::path::absolute(clip)?;
        let as_str = absolute.to_str().ok_or_else(|| {
            CoreError::PathError(format!("Clip path is not valid UTF-8: {}", absolute.display()))
        })?;
        content.push_str("file ");
        content.push_str(&quote_concat_path(as_str));
        content.push('\n');
    }
    Ok(content)
}

/// Writes a concat list for `clips` into a new temp file under `dir`.
///
/// The file is registered with `tracker` before anything is written to it,
/// so an interruption mid-write still leaves it to the cleanup. A failed write
/// removes the file before the error is returned.
pub fn write_concat_list(tracker: &ArtifactTracker, dir: &Path, clips: &[PathBuf]) -> CoreResult<PathBuf> {
    let content = format_concat_list(clips)?;
    let (file, path) = create_tracked_temp_file(tracker, dir, CONCAT_LIST_PREFIX, "txt")?;
    fill_tracked_file(tracker, &path, file, &content)?;

    log::debug!("Wrote concat list with {} clip(s) to {}", clips.len(), path.display());
    Ok(path)
}

/// Writes `content` through `writer` into the tracked file at `path`,
/// discarding the file if the write fails.
fn fill_tracked_file<W: Write>(tracker: &ArtifactTracker, path: &Path, writer: W, content: &str) -> CoreResult<()> {
    let result = (|| -> io::Result<()> {
        let mut writer = BufWriter::new(writer);
        writer.write_all(content.as_bytes())?;
        writer.flush()
    })();

    if let Err(e) = result {
        log::warn!("Failed to write {}: {}", path.display(), e);
        tracker.discard_temp_file(path);
        return Err(e.into());
    }
    Ok(())
}
