// Integration tests for speaker file grouping and recombination
//
// A recording fake joiner stands in for ffmpeg so the fast path, join
// order, and idempotence can be observed without the external tool.

use anyhow::Result;
use meeting_scribe::{
    combine_speaker_parts, group_speaker_parts, parse_speaker_filename, AudioJoiner,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingJoiner {
    calls: Mutex<Vec<(Vec<PathBuf>, PathBuf)>>,
}

impl RecordingJoiner {
    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl AudioJoiner for RecordingJoiner {
    async fn concat(&self, parts: &[PathBuf], output: &Path) -> Result<()> {
        std::fs::write(output, b"joined")?;
        self.calls
            .lock()
            .unwrap()
            .push((parts.to_vec(), output.to_path_buf()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"wav").unwrap();
    path
}

#[test]
fn test_parse_speaker_filename_fields() -> Result<()> {
    let parsed = parse_speaker_filename(Path::new("audioAlice12123456789.wav"))?;
    assert_eq!(parsed.speaker, "Alice");
    assert_eq!(parsed.recording, 1);
    assert_eq!(parsed.part, 2);
    assert_eq!(parsed.suffix, "123456789");
    Ok(())
}

#[test]
fn test_parse_speaker_filename_is_case_insensitive() -> Result<()> {
    let parsed = parse_speaker_filename(Path::new("AudioBob11000000001.wav"))?;
    assert_eq!(parsed.speaker, "Bob");
    Ok(())
}

#[test]
fn test_parse_speaker_filename_rejects_bad_names() {
    let err = parse_speaker_filename(Path::new("recording1.wav")).unwrap_err();
    assert!(
        err.to_string().contains("recording1.wav"),
        "error should name the offending file: {}",
        err
    );
}

#[test]
fn test_grouping_rejects_duplicate_part_numbers() {
    let temp = TempDir::new().unwrap();
    let files = vec![
        touch(temp.path(), "audioBob11123456789.wav"),
        touch(temp.path(), "audioBob11987654321.wav"),
    ];

    let err = group_speaker_parts(&files).unwrap_err();
    assert!(err.to_string().contains("duplicate part"), "{}", err);
}

#[tokio::test]
async fn test_single_part_speakers_use_original_files() -> Result<()> {
    // Every speaker has exactly one part, so the joiner is never invoked
    let temp = TempDir::new()?;
    let alice = touch(temp.path(), "audioAlice11123456789.wav");
    let bob = touch(temp.path(), "audioBob11234567890.wav");

    let joiner = RecordingJoiner::default();
    let combined = combine_speaker_parts(&[alice.clone(), bob.clone()], &joiner).await?;

    assert_eq!(combined.len(), 2);
    assert_eq!(combined["Alice"], alice);
    assert_eq!(combined["Bob"], bob);
    assert_eq!(joiner.call_count(), 0, "fast path must not invoke the joiner");
    assert!(!temp.path().join("Combined").exists());
    Ok(())
}

#[tokio::test]
async fn test_split_recordings_join_in_ascending_part_order() -> Result<()> {
    // Join order follows the part number, not filesystem listing order
    let temp = TempDir::new()?;
    let part2 = touch(temp.path(), "audioBob12222222222.wav");
    let part1 = touch(temp.path(), "audioBob11111111111.wav");

    let joiner = RecordingJoiner::default();
    // Deliberately pass part 2 first
    let combined = combine_speaker_parts(&[part2.clone(), part1.clone()], &joiner).await?;

    let calls = joiner.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, vec![part1, part2], "parts must join in ascending part order");

    let expected_output = temp.path().join("Combined").join("audioBob_combined.wav");
    assert_eq!(calls[0].1, expected_output);
    assert_eq!(combined["Bob"], expected_output);
    Ok(())
}

#[tokio::test]
async fn test_mixed_set_copies_single_part_speakers() -> Result<()> {
    // When any speaker is split, single-part speakers still land in
    // Combined/ via a one-element join
    let temp = TempDir::new()?;
    let alice = touch(temp.path(), "audioAlice11123456789.wav");
    let bob1 = touch(temp.path(), "audioBob11111111111.wav");
    let bob2 = touch(temp.path(), "audioBob12222222222.wav");

    let joiner = RecordingJoiner::default();
    let combined = combine_speaker_parts(&[alice.clone(), bob1, bob2], &joiner).await?;

    assert_eq!(joiner.call_count(), 2);
    let calls = joiner.calls.lock().unwrap();
    let alice_call = calls.iter().find(|(parts, _)| parts.contains(&alice)).unwrap();
    assert_eq!(alice_call.0.len(), 1);
    assert_eq!(
        combined["Alice"],
        temp.path().join("Combined").join("audioAlice_combined.wav")
    );
    Ok(())
}

#[tokio::test]
async fn test_recombination_is_idempotent() -> Result<()> {
    // A second run finds the combined files and skips the joiner
    let temp = TempDir::new()?;
    let files = vec![
        touch(temp.path(), "audioBob11111111111.wav"),
        touch(temp.path(), "audioBob12222222222.wav"),
    ];

    let joiner = RecordingJoiner::default();
    let first = combine_speaker_parts(&files, &joiner).await?;
    assert_eq!(joiner.call_count(), 1);

    let second = combine_speaker_parts(&files, &joiner).await?;
    assert_eq!(joiner.call_count(), 1, "second run must not re-invoke the joiner");
    assert_eq!(first, second);
    Ok(())
}
