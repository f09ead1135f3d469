use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::Config;

const AFTER_HELP: &str = "\
Examples:
  # Process a Zoom-style meeting folder and write transcript + notes:
  meeting-scribe -f './2024-01-01 09.00.00 Weekly Sync'

Notes:
  - The meeting folder must contain an 'Audio Record' subdirectory with one
    audio file per speaker; files are converted to WAV as needed.
  - Start time can be supplied with --start-time in ISO format
    (YYYY-MM-DD HH:MM:SS or YYYY-MM-DDTHH:MM:SS); otherwise it is extracted
    from the folder name when possible.
  - --overwrite regenerates an existing transcript instead of reusing it.

Expected folder layout:
  <meeting_folder>/
      <master_recording>.m4a
      Audio Record/
          audio<speaker>11123456789.m4a
          ...";

/// Offline meeting notetaker: per-speaker recordings in, transcript and
/// Markdown notes out.
#[derive(Debug, Parser)]
#[command(name = "meeting-scribe", version, after_help = AFTER_HELP)]
pub struct Cli {
    /// Path to the meeting folder (one audio file per speaker under 'Audio Record')
    #[arg(short = 'f', long)]
    pub meeting_folder: PathBuf,

    /// Output folder for transcript and notes (default: Transcripts/<meeting-folder-name>/)
    #[arg(short = 'o', long)]
    pub output_folder: Option<PathBuf>,

    /// Wall-clock meeting start time in ISO 8601 format
    /// (e.g. '2023-01-01 10:00:00' or '2023-01-01T10:00:00')
    #[arg(short = 's', long)]
    pub start_time: Option<String>,

    /// ASR model name (e.g. parakeet-tdt-0.6b-v2, parakeet-tdt-1.1b)
    #[arg(short = 'm', long)]
    pub asr_model: Option<String>,

    /// Language model for notes generation (e.g. gpt-oss:20b)
    #[arg(short = 'l', long)]
    pub language_model: Option<String>,

    /// Overwrite an existing transcript instead of reusing it
    #[arg(long)]
    pub overwrite: bool,

    /// Path to a TOML config file overriding the built-in defaults
    #[arg(short = 'c', long)]
    pub config: Option<String>,
}

/// Validated inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub meeting_folder: PathBuf,
    pub output_folder: PathBuf,
    /// Explicit anchor from --start-time, when given
    pub start_time: Option<NaiveDateTime>,
    pub overwrite: bool,
}

const ASR_MODELS: &[&str] = &["parakeet-tdt-0.6b-v2", "parakeet-tdt-1.1b"];

/// Validate CLI arguments against the loaded configuration and build the
/// run options. Fatal on a missing meeting folder, an unparseable start
/// time, or an unknown ASR model.
pub fn validate(cli: &Cli, config: &Config) -> Result<RunOptions> {
    if !cli.meeting_folder.is_dir() {
        bail!(
            "meeting folder does not exist: {}",
            cli.meeting_folder.display()
        );
    }

    let start_time = cli
        .start_time
        .as_deref()
        .map(parse_start_time)
        .transpose()?;
    if let Some(start) = start_time {
        info!("Using start time: {}", start);
    }

    if !ASR_MODELS.contains(&config.asr.model.as_str()) {
        bail!(
            "invalid ASR model: {} (choose from {})",
            config.asr.model,
            ASR_MODELS.join(", ")
        );
    }

    let output_folder = match &cli.output_folder {
        Some(folder) => folder.clone(),
        None => {
            let meeting_name = cli
                .meeting_folder
                .file_name()
                .with_context(|| {
                    format!(
                        "cannot derive an output folder from {}",
                        cli.meeting_folder.display()
                    )
                })?
                .to_owned();
            PathBuf::from(&config.pipeline.transcripts_dir).join(meeting_name)
        }
    };
    std::fs::create_dir_all(&output_folder)
        .with_context(|| format!("failed to create output folder {}", output_folder.display()))?;

    Ok(RunOptions {
        meeting_folder: cli.meeting_folder.clone(),
        output_folder,
        start_time,
        overwrite: cli.overwrite,
    })
}

/// Parse an ISO 8601 start time, accepting a space or 'T' separator.
pub fn parse_start_time(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .with_context(|| format!("invalid start time: {} (expected ISO 8601)", raw))
}

// Zoom folder naming convention: "YYYY-MM-DD HH.MM.SS <Name>'s Zoom Meeting"
static FOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(\d{2}\.\d{2}\.\d{2})\s+(.*)")
        .expect("folder pattern is a valid regex")
});

/// Extract the meeting start time from a Zoom-style folder name, if it
/// follows the convention.
pub fn start_time_from_folder_name(folder: &Path) -> Option<NaiveDateTime> {
    let base = folder.file_name()?.to_str()?;
    let caps = FOLDER_PATTERN.captures(base)?;

    let stamp = format!("{} {}", &caps[1], &caps[2]);
    match NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H.%M.%S") {
        Ok(start) => Some(start),
        Err(_) => {
            warn!(
                "Failed to parse meeting start time from folder name '{}'; \
                 expected a Zoom layout like 'YYYY-MM-DD HH.MM.SS <Name>'s Zoom Meeting'",
                base
            );
            None
        }
    }
}

/// Verify that ffmpeg is reachable before any audio work begins.
pub async fn ensure_ffmpeg() -> Result<()> {
    let available = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
        .map(|out| out.status.success())
        .unwrap_or(false);

    if !available {
        bail!("ffmpeg is required but was not found in PATH; please install ffmpeg");
    }
    Ok(())
}
