use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::segment::{MeetingStart, Segment};

/// Render the ordered segment sequence into the transcript text format.
///
/// Line 1 is the meeting anchor header; each following line is
/// `[<start> - <end>] (<speaker>) <text>`. The caller is responsible for
/// having already interleaved the segments. Output is deterministic so
/// repeated runs over identical input match byte-for-byte.
pub fn serialize_transcript(segments: &[Segment], anchor: MeetingStart) -> String {
    let mut out = format!(
        "Meeting Start Date and Time: {}\n",
        anchor.format("%Y-%m-%d %H:%M:%S")
    );
    for seg in segments {
        out.push_str(&format!(
            "[{} - {}] ({}) {}\n",
            seg.start, seg.end, seg.speaker, seg.text
        ));
    }
    out
}

/// Write `contents` to `path` all-or-nothing.
///
/// Writes into a temp file in the target directory and renames it over the
/// destination, so a failure mid-write never leaves a partial file behind.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("output path has no parent directory: {}", path.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to persist {}", path.display()))?;
    Ok(())
}
