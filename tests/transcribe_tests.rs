// Tests for the speaker transcription adapter: silence handling, text
// trimming, timestamp anchoring, and failure propagation. A fake
// recognizer stands in for the ASR backend.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use meeting_scribe::{
    transcribe_speakers, MeetingStart, RawSegment, SegmentTime, SpeechRecognizer, VadParams,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

struct FakeRecognizer {
    calls: Mutex<Vec<PathBuf>>,
    segments: Vec<RawSegment>,
}

impl FakeRecognizer {
    fn returning(segments: Vec<RawSegment>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            segments,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for FakeRecognizer {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<RawSegment>> {
        self.calls.lock().unwrap().push(audio.to_path_buf());
        Ok(self.segments.clone())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct FailingRecognizer;

#[async_trait::async_trait]
impl SpeechRecognizer for FailingRecognizer {
    async fn transcribe(&self, _audio: &Path) -> Result<Vec<RawSegment>> {
        bail!("model exploded")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Write a one-second 16 kHz mono WAV with a constant sample amplitude.
fn write_wav(dir: &Path, name: &str, amplitude: i16) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..16000 {
        // Square wave so the signal has energy rather than DC offset
        let sample = if i % 2 == 0 { amplitude } else { -amplitude };
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn anchor() -> MeetingStart {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn test_silent_file_yields_empty_segment_list() -> Result<()> {
    // No speech means an empty entry, never an error, and no
    // recognizer call
    let temp = TempDir::new()?;
    let silent = write_wav(temp.path(), "audioMute11123456789.wav", 0);

    let mut files = BTreeMap::new();
    files.insert("Mute".to_string(), silent);

    let recognizer = FakeRecognizer::returning(vec![]);
    let result =
        transcribe_speakers(&recognizer, &files, Some(anchor()), &VadParams::default()).await?;

    assert_eq!(result.len(), 1, "silent speaker must keep its map entry");
    assert!(result["Mute"].is_empty());
    assert_eq!(recognizer.call_count(), 0, "silent files must skip the recognizer");
    Ok(())
}

#[tokio::test]
async fn test_segments_are_anchored_and_trimmed() -> Result<()> {
    let temp = TempDir::new()?;
    let voiced = write_wav(temp.path(), "audioAlice11123456789.wav", 8000);

    let mut files = BTreeMap::new();
    files.insert("Alice".to_string(), voiced);

    let recognizer = FakeRecognizer::returning(vec![RawSegment {
        start: 5.0,
        end: 7.0,
        text: "  hi there  ".to_string(),
    }]);
    let result =
        transcribe_speakers(&recognizer, &files, Some(anchor()), &VadParams::default()).await?;

    assert_eq!(recognizer.call_count(), 1);
    let segments = &result["Alice"];
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "hi there");
    assert_eq!(segments[0].speaker, "Alice");

    let expected_start = anchor() + chrono::Duration::seconds(5);
    let expected_end = anchor() + chrono::Duration::seconds(7);
    assert_eq!(segments[0].start, SegmentTime::Absolute(expected_start));
    assert_eq!(segments[0].end, SegmentTime::Absolute(expected_end));
    Ok(())
}

#[tokio::test]
async fn test_offsets_stay_relative_without_an_anchor() -> Result<()> {
    let temp = TempDir::new()?;
    let voiced = write_wav(temp.path(), "audioBob11123456789.wav", 8000);

    let mut files = BTreeMap::new();
    files.insert("Bob".to_string(), voiced);

    let recognizer = FakeRecognizer::returning(vec![RawSegment {
        start: 1.5,
        end: 2.0,
        text: "ok".to_string(),
    }]);
    let result = transcribe_speakers(&recognizer, &files, None, &VadParams::default()).await?;

    let segments = &result["Bob"];
    assert_eq!(segments[0].start, SegmentTime::Relative(1.5));
    assert_eq!(segments[0].end, SegmentTime::Relative(2.0));
    Ok(())
}

#[tokio::test]
async fn test_empty_text_segments_are_retained() -> Result<()> {
    let temp = TempDir::new()?;
    let voiced = write_wav(temp.path(), "audioAlice11123456789.wav", 8000);

    let mut files = BTreeMap::new();
    files.insert("Alice".to_string(), voiced);

    let recognizer = FakeRecognizer::returning(vec![RawSegment {
        start: 0.0,
        end: 0.5,
        text: "   ".to_string(),
    }]);
    let result =
        transcribe_speakers(&recognizer, &files, Some(anchor()), &VadParams::default()).await?;

    let segments = &result["Alice"];
    assert_eq!(segments.len(), 1, "empty-after-trim segments are kept");
    assert_eq!(segments[0].text, "");
    Ok(())
}

#[tokio::test]
async fn test_recognizer_failure_aborts_the_phase() -> Result<()> {
    let temp = TempDir::new()?;
    let voiced = write_wav(temp.path(), "audioAlice11123456789.wav", 8000);

    let mut files = BTreeMap::new();
    files.insert("Alice".to_string(), voiced);

    let err = transcribe_speakers(&FailingRecognizer, &files, None, &VadParams::default())
        .await
        .unwrap_err();
    assert!(
        format!("{:#}", err).contains("Alice"),
        "error should name the failing speaker: {:#}",
        err
    );
    Ok(())
}

#[test]
fn test_vad_distinguishes_silence_from_speech() -> Result<()> {
    let temp = TempDir::new()?;
    let silent = write_wav(temp.path(), "silent.wav", 0);
    let voiced = write_wav(temp.path(), "voiced.wav", 8000);

    let params = VadParams::default();
    assert!(!meeting_scribe::audio::has_speech(&silent, &params)?);
    assert!(meeting_scribe::audio::has_speech(&voiced, &params)?);
    Ok(())
}
