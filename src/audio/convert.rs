use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// Subdirectory of a meeting folder that holds the per-speaker recordings.
pub const AUDIO_RECORD_DIR: &str = "Audio Record";

/// Prepare a meeting folder's audio for transcription.
///
/// Converts master recordings at the folder top level and per-speaker
/// recordings under `Audio Record/` from m4a to 16 kHz mono WAV, skipping
/// files whose WAV already exists, then returns the sorted speaker WAV list.
///
/// Missing `Audio Record/` subdirectory or zero audio files are fatal
/// input-shape errors.
pub async fn prepare_meeting_audio(meeting_folder: &Path) -> Result<Vec<PathBuf>> {
    info!("Analyzing folder: {}", meeting_folder.display());
    if !meeting_folder.is_dir() {
        bail!("{} is not a valid directory", meeting_folder.display());
    }

    // Master recordings live at the meeting-folder top level
    let masters = list_with_extension(meeting_folder, "m4a")?;
    convert_missing(&masters, "master").await?;

    let record_dir = meeting_folder.join(AUDIO_RECORD_DIR);
    if !record_dir.is_dir() {
        bail!(
            "{} is not a valid directory; a meeting folder must contain an '{}' subdirectory",
            record_dir.display(),
            AUDIO_RECORD_DIR
        );
    }

    let speaker_m4a = list_with_extension(&record_dir, "m4a")?;
    let existing_wavs = list_with_extension(&record_dir, "wav")?;
    if speaker_m4a.is_empty() && existing_wavs.is_empty() {
        bail!("no audio files found in {}", record_dir.display());
    }

    convert_missing(&speaker_m4a, "speaker").await?;

    let mut wav_files = list_with_extension(&record_dir, "wav")?;
    if !speaker_m4a.is_empty() && speaker_m4a.len() != wav_files.len() {
        warn!(
            ".m4a count ({}) does not match .wav count ({}) in {}; something may have gone wrong",
            speaker_m4a.len(),
            wav_files.len(),
            record_dir.display()
        );
    }

    wav_files.sort();
    Ok(wav_files)
}

/// Convert each source whose sibling `.wav` is missing. Idempotent: already
/// converted files are left alone so a rerun resumes cheaply.
async fn convert_missing(sources: &[PathBuf], kind: &str) -> Result<()> {
    let missing: Vec<&PathBuf> = sources
        .iter()
        .filter(|src| !src.with_extension("wav").exists())
        .collect();

    if missing.is_empty() {
        if !sources.is_empty() {
            info!("All {} audio files already converted to .wav", kind);
        }
        return Ok(());
    }

    info!("Converting {} audio files to .wav", kind);
    for src in missing {
        let wav = src.with_extension("wav");
        info!("  Converting: {}", wav.display());
        convert_to_wav(src, &wav).await?;
    }
    Ok(())
}

/// Convert one audio file to 16 kHz mono WAV via ffmpeg.
pub async fn convert_to_wav(input: &Path, output: &Path) -> Result<()> {
    let result = Command::new("ffmpeg")
        .arg("-i")
        .arg(input)
        .args(["-ac", "1", "-ar", "16000"])
        .arg(output)
        .output()
        .await
        .with_context(|| format!("failed to run ffmpeg on {}", input.display()))?;

    if !result.status.success() {
        bail!(
            "ffmpeg conversion failed for {}: {}",
            input.display(),
            String::from_utf8_lossy(&result.stderr)
        );
    }
    Ok(())
}

/// List files in `dir` with the given extension (case-insensitive), unsorted.
fn list_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read directory entry in {}", dir.display()))?
            .path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    Ok(files)
}
