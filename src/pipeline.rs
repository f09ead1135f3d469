use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::asr::{transcribe_speakers, AsrBackendFactory};
use crate::audio::{combine_speaker_parts, prepare_meeting_audio, FfmpegJoiner};
use crate::cli::{start_time_from_folder_name, RunOptions};
use crate::config::Config;
use crate::notes::{render_markdown, NotesBackendFactory};
use crate::transcript::{interleave, serialize_transcript, write_atomic, MeetingStart};

/// Run the whole pipeline for one meeting, strictly sequentially:
/// anchor resolution, audio conversion, grouping/recombination,
/// transcription + interleaving + serialization, then notes structuring and
/// rendering. Any failure aborts the run; idempotent skips (existing WAVs,
/// combined files, transcript) make a rerun resume cheaply.
pub async fn run(opts: &RunOptions, config: &Config) -> Result<()> {
    // 1. Resolve the meeting anchor: explicit arg, then folder name, then
    //    the configured placeholder.
    let meeting_start: MeetingStart = match opts.start_time {
        Some(start) => {
            info!("Using provided start time: {}", start);
            start
        }
        None => match start_time_from_folder_name(&opts.meeting_folder) {
            Some(start) => {
                info!("Extracted start time from folder name: {}", start);
                start
            }
            None => {
                let fallback = config.default_start_time()?;
                info!("No start time available, using default: {}", fallback);
                fallback
            }
        },
    };

    // 2. Convert and gather per-speaker audio.
    info!("Processing folder of audio files...");
    let wav_files = prepare_meeting_audio(&opts.meeting_folder).await?;

    // 3. Recombine split recordings into one file per speaker.
    let joiner = FfmpegJoiner;
    let speaker_files = combine_speaker_parts(&wav_files, &joiner).await?;
    info!("Detected audio files:");
    for (speaker, file) in &speaker_files {
        info!("  {}: {}", speaker, file.display());
    }

    let stamp = meeting_start.format("%Y%m%d_%H%M");
    let transcript_path = opts.output_folder.join(format!("transcript_{}.txt", stamp));
    let notes_path = opts.output_folder.join(format!("notes_{}.md", stamp));

    // 4. Transcribe, interleave, and serialize, unless a transcript from a
    //    previous run can be reused.
    if !transcript_path.exists() || opts.overwrite {
        let recognizer = AsrBackendFactory::create(&config.asr)?;
        let vad = config.audio.vad_params();
        let result =
            transcribe_speakers(recognizer.as_ref(), &speaker_files, Some(meeting_start), &vad)
                .await;
        // The ASR model must be gone before the notes model loads,
        // success or not.
        let transcriptions = settle_phase(result, recognizer.release().await, "asr")?;

        let interleaved = interleave(&transcriptions);
        let text = serialize_transcript(&interleaved, meeting_start);
        write_atomic(&transcript_path, &text)?;
        info!("Text transcript saved to {}", transcript_path.display());
    } else {
        info!(
            "Transcript already exists at {}, skipping transcription",
            transcript_path.display()
        );
        info!("Continuing to generate notes");
    }

    // 5. Structure the serialized transcript into notes.
    let transcript_text = tokio::fs::read_to_string(&transcript_path)
        .await
        .with_context(|| format!("failed to read transcript {}", transcript_path.display()))?;

    let backend = NotesBackendFactory::create(&config.notes)?;
    info!("Generating meeting notes with backend: {}", backend.name());
    let result = backend.structure(&transcript_text).await;
    let structured = settle_phase(result, backend.release().await, "notes")?;

    if config.notes.save_thinking {
        if let Some(thinking) = &structured.thinking {
            let thinking_path = opts
                .output_folder
                .join(format!("transcript_{}_thought_process.txt", stamp));
            write_atomic(&thinking_path, thinking)?;
            info!("Thought process saved to {}", thinking_path.display());
        }
    }

    // 6. Render and save the Markdown notes.
    let markdown = render_markdown(&structured.document);
    write_atomic(&notes_path, &markdown)?;
    info!("Meeting notes saved to {}", notes_path.display());

    Ok(())
}

/// Combine a phase result with its backend release outcome. Releasing is
/// best-effort cleanup; a failure there is logged, never allowed to mask
/// the phase's own result.
fn settle_phase<T>(phase: Result<T>, release: Result<()>, backend: &str) -> Result<T> {
    if let Err(err) = release {
        warn!("failed to release {} backend: {:#}", backend, err);
    }
    phase
}

#[cfg(test)]
mod tests {
    use super::settle_phase;
    use anyhow::anyhow;

    #[test]
    fn test_release_failure_does_not_mask_a_successful_phase() {
        let settled = settle_phase(Ok(42), Err(anyhow!("unload failed")), "asr");
        assert_eq!(settled.unwrap(), 42);
    }

    #[test]
    fn test_phase_failure_propagates_over_release_failure() {
        let settled: anyhow::Result<()> = settle_phase(
            Err(anyhow!("model exploded")),
            Err(anyhow!("unload failed")),
            "notes",
        );
        assert!(settled.unwrap_err().to_string().contains("model exploded"));
    }

    #[test]
    fn test_clean_release_leaves_the_phase_result_alone() {
        assert_eq!(settle_phase(Ok("done"), Ok(()), "notes").unwrap(), "done");
    }
}
