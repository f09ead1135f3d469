use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Opaque participant identifier, derived from the filename pattern.
pub type SpeakerLabel = String;

// Speaker identity and part ordering are encoded entirely in the filename:
// the literal "audio", the speaker name, a recording digit, a duplicate/part
// digit, then a 9-digit opaque suffix. Example: "audioAlice11123456789.wav".
// This is the single place that knows the encoding.
static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^audio(?P<name>.+?)(?P<recording>\d)(?P<duplicate>\d)(?P<magic>\d{9})$")
        .expect("filename pattern is a valid regex")
});

/// Fields parsed out of a per-speaker audio filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerFilename {
    /// Speaker name (grouping key)
    pub speaker: SpeakerLabel,
    /// Recording number
    pub recording: u8,
    /// Duplicate/part number; ascending part order is the join order
    pub part: u8,
    /// 9-digit opaque suffix
    pub suffix: String,
}

/// Parse the speaker filename schema from a path's file stem.
///
/// A name that does not match the pattern is a hard error naming the file:
/// grouping cannot proceed with unidentifiable inputs.
pub fn parse_speaker_filename(path: &Path) -> Result<SpeakerFilename> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("audio file has no usable name: {}", path.display()))?;

    let Some(caps) = FILENAME_PATTERN.captures(stem) else {
        bail!(
            "could not extract speaker name from file: {} \
             (expected a name like 'audiospeaker01234567891.wav')",
            path.display()
        );
    };

    // Single digits per the pattern, so these parses cannot fail
    let recording: u8 = caps["recording"].parse().unwrap_or(0);
    let part: u8 = caps["duplicate"].parse().unwrap_or(0);

    Ok(SpeakerFilename {
        speaker: caps["name"].trim().to_string(),
        recording,
        part,
        suffix: caps["magic"].to_string(),
    })
}
