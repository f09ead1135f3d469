use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

use super::naming::{parse_speaker_filename, SpeakerLabel};

/// Subdirectory of `Audio Record/` where combined recordings are cached.
pub const COMBINED_DIR: &str = "Combined";

/// Joins a speaker's recording parts into one continuous audio file.
///
/// The seam exists so the grouping logic can be exercised without an
/// external tool, and so a timeout policy can be added around the real
/// joiner without touching the grouping.
#[async_trait::async_trait]
pub trait AudioJoiner: Send + Sync {
    /// Concatenate `parts` (already in join order) into `output`, losslessly.
    ///
    /// On failure the output must be treated as invalid even if a file
    /// exists at the path.
    async fn concat(&self, parts: &[PathBuf], output: &Path) -> Result<()>;

    /// Joiner name for logging
    fn name(&self) -> &str;
}

/// Production joiner: ffmpeg's concat demuxer with stream copy (no
/// re-encoding). A single part is copied rather than joined.
pub struct FfmpegJoiner;

#[async_trait::async_trait]
impl AudioJoiner for FfmpegJoiner {
    async fn concat(&self, parts: &[PathBuf], output: &Path) -> Result<()> {
        if parts.is_empty() {
            bail!("cannot combine an empty part list into {}", output.display());
        }

        if parts.len() == 1 {
            tokio::fs::copy(&parts[0], output).await.with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    parts[0].display(),
                    output.display()
                )
            })?;
            return Ok(());
        }

        // ffmpeg's concat demuxer reads the part list from a file
        let mut list = tempfile::NamedTempFile::new().context("failed to create concat list")?;
        for part in parts {
            let absolute = part
                .canonicalize()
                .with_context(|| format!("recording part not found: {}", part.display()))?;
            writeln!(list, "file '{}'", absolute.display()).context("failed to write concat list")?;
        }
        list.flush().context("failed to flush concat list")?;

        let result = Command::new("ffmpeg")
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(list.path())
            .args(["-c", "copy"])
            .arg(output)
            .output()
            .await
            .context("failed to run ffmpeg concat")?;

        if !result.status.success() {
            bail!(
                "ffmpeg concat failed for {}: {}",
                output.display(),
                String::from_utf8_lossy(&result.stderr)
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Group speaker WAV files by speaker name, keyed by part number.
///
/// Input is sorted first so traversal order never depends on filesystem
/// listing order. A repeated part number for one speaker is an input-shape
/// error: part indices are the join order and must be unique.
pub fn group_speaker_parts(
    wav_files: &[PathBuf],
) -> Result<BTreeMap<SpeakerLabel, BTreeMap<u8, PathBuf>>> {
    let mut files = wav_files.to_vec();
    files.sort();

    let mut groups: BTreeMap<SpeakerLabel, BTreeMap<u8, PathBuf>> = BTreeMap::new();
    for file in files {
        let parsed = parse_speaker_filename(&file)?;
        let parts = groups.entry(parsed.speaker.clone()).or_default();
        if let Some(previous) = parts.insert(parsed.part, file.clone()) {
            bail!(
                "duplicate part {} for speaker '{}': {} and {}",
                parsed.part,
                parsed.speaker,
                previous.display(),
                file.display()
            );
        }
    }
    Ok(groups)
}

/// Produce exactly one continuous audio file per speaker.
///
/// Fast path: when every speaker has a single part, the original paths are
/// returned unchanged and the joiner is never invoked. Otherwise each
/// speaker's parts are joined in ascending part order into
/// `Combined/audio<name>_combined.wav`, skipping speakers whose combined
/// file already exists.
pub async fn combine_speaker_parts(
    wav_files: &[PathBuf],
    joiner: &dyn AudioJoiner,
) -> Result<BTreeMap<SpeakerLabel, PathBuf>> {
    let groups = group_speaker_parts(wav_files)?;

    if groups.values().all(|parts| parts.len() == 1) {
        info!("No split recordings detected, using original audio files");
        return Ok(groups
            .into_iter()
            .filter_map(|(name, parts)| parts.into_values().next().map(|p| (name, p)))
            .collect());
    }

    info!("Split recordings detected, combining audio files...");
    let record_dir = wav_files[0]
        .parent()
        .with_context(|| format!("audio file has no parent directory: {}", wav_files[0].display()))?;
    let combine_dir = record_dir.join(COMBINED_DIR);
    std::fs::create_dir_all(&combine_dir)
        .with_context(|| format!("failed to create {}", combine_dir.display()))?;

    let mut combined = BTreeMap::new();
    for (name, parts) in groups {
        let output = combine_dir.join(format!("audio{}_combined.wav", name));
        if output.exists() {
            info!("Combined file already exists, skipping: {}", output.display());
        } else {
            info!("Combining audio files for speaker: {}", name);
            // BTreeMap iteration gives ascending part order
            let ordered: Vec<PathBuf> = parts.into_values().collect();
            joiner
                .concat(&ordered, &output)
                .await
                .with_context(|| format!("failed to combine recording parts for speaker '{}'", name))?;
        }
        combined.insert(name, output);
    }
    Ok(combined)
}
