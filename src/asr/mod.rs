//! Speaker transcription
//!
//! `SpeechRecognizer` is the single interface over interchangeable ASR
//! backends; `transcribe_speakers` drives the per-speaker loop (silence
//! check, recognition, trimming, anchoring).

mod http;

pub use http::HttpRecognizer;

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::audio::vad::{has_speech, VadParams};
use crate::audio::SpeakerLabel;
use crate::config::AsrConfig;
use crate::transcript::{MeetingStart, Segment, SegmentTime};

/// One raw recognized span: model-relative offsets in seconds plus text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Speech recognition capability: one audio file in, timestamped raw
/// segments out. Implementations own whatever model or server state they
/// need; `release` must free it and is called on every exit path of the
/// transcription phase.
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe one audio file into raw segments with model-relative
    /// start/end offsets.
    async fn transcribe(&self, audio: &Path) -> Result<Vec<RawSegment>>;

    /// Release model resources. Called after the transcription phase
    /// completes, whether it succeeded or failed.
    async fn release(&self) -> Result<()> {
        Ok(())
    }

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Creates a recognizer from configuration.
pub struct AsrBackendFactory;

impl AsrBackendFactory {
    pub fn create(config: &AsrConfig) -> Result<Box<dyn SpeechRecognizer>> {
        match config.backend.as_str() {
            "http" => Ok(Box::new(HttpRecognizer::new(config)?)),
            other => bail!("unknown ASR backend: {}", other),
        }
    }
}

/// Transcribe each speaker's audio file independently.
///
/// A voice-activity check runs first; a silent file yields an empty segment
/// list for that speaker (the entry is retained, the recognizer is not
/// invoked). Segment text is trimmed but empty-text segments are kept.
/// Offsets are anchored to `meeting_start` by addition when supplied,
/// otherwise left relative.
///
/// The speaker map is sorted, so iteration order (and therefore downstream
/// flattening order) is reproducible. Any recognizer failure aborts the
/// whole phase: notes are never produced from an incomplete transcript.
pub async fn transcribe_speakers(
    recognizer: &dyn SpeechRecognizer,
    speaker_files: &BTreeMap<SpeakerLabel, PathBuf>,
    meeting_start: Option<MeetingStart>,
    vad: &VadParams,
) -> Result<BTreeMap<SpeakerLabel, Vec<Segment>>> {
    info!("Starting transcription with backend: {}", recognizer.name());

    let mut transcriptions = BTreeMap::new();
    for (speaker, file) in speaker_files {
        info!("Checking audio for {}...", speaker);

        if !has_speech(file, vad)
            .with_context(|| format!("voice-activity check failed for speaker '{}'", speaker))?
        {
            info!("  No speech detected for {}, skipping.", speaker);
            transcriptions.insert(speaker.clone(), Vec::new());
            continue;
        }

        info!("  Transcribing audio for {}...", speaker);
        let raw = recognizer
            .transcribe(file)
            .await
            .with_context(|| format!("transcription failed for speaker '{}'", speaker))?;

        let segments = raw
            .into_iter()
            .map(|seg| Segment {
                start: SegmentTime::from_offset(seg.start, meeting_start),
                end: SegmentTime::from_offset(seg.end, meeting_start),
                text: seg.text.trim().to_string(),
                speaker: speaker.clone(),
            })
            .collect();
        transcriptions.insert(speaker.clone(), segments);
    }

    Ok(transcriptions)
}
