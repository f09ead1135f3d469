use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::audio::VadParams;

/// Application configuration. Every value has a built-in default; an
/// optional TOML file overrides them section by section.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub audio: AudioConfig,
    pub asr: AsrConfig,
    pub notes: NotesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Anchor used when no start time is supplied and folder-name
    /// extraction fails. A placeholder, not a product requirement; kept
    /// configurable so its exact value is not load-bearing.
    pub default_start_time: String,

    /// Default output root when no output folder is given
    pub transcripts_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Normalized RMS threshold for the voice-activity check
    pub vad_threshold: f64,

    /// Minimum cumulative voiced audio (ms) to count a file as speech
    pub min_speech_ms: u64,

    /// Voice-activity analysis window (ms)
    pub vad_window_ms: u64,
}

impl AudioConfig {
    pub fn vad_params(&self) -> VadParams {
        VadParams {
            threshold: self.vad_threshold,
            min_speech_ms: self.min_speech_ms,
            window_ms: self.vad_window_ms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AsrConfig {
    /// Backend selector ("http")
    pub backend: String,

    /// ASR server base URL
    pub endpoint: String,

    /// Model name passed to the backend
    pub model: String,

    /// Request timeout in seconds (model inference can be slow)
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    /// Backend selector ("ollama")
    pub backend: String,

    /// Ollama server base URL
    pub base_url: String,

    /// Language model name
    pub model: String,

    /// Thinking effort passed to the model
    pub think: String,

    /// Approximate prompt token ceiling; exceeding it is fatal
    pub max_prompt_tokens: u64,

    /// Persist the model's thinking text next to the transcript
    pub save_thinking: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration: built-in defaults, optionally overridden by a
    /// TOML file.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("pipeline.default_start_time", "2020-01-01 00:00:00")?
            .set_default("pipeline.transcripts_dir", "Transcripts")?
            .set_default("audio.vad_threshold", 0.01)?
            .set_default("audio.min_speech_ms", 250)?
            .set_default("audio.vad_window_ms", 30)?
            .set_default("asr.backend", "http")?
            .set_default("asr.endpoint", "http://localhost:9090")?
            .set_default("asr.model", "parakeet-tdt-0.6b-v2")?
            .set_default("asr.timeout_secs", 3600)?
            .set_default("notes.backend", "ollama")?
            .set_default("notes.base_url", "http://localhost:11434")?
            .set_default("notes.model", "gpt-oss:20b")?
            .set_default("notes.think", "high")?
            .set_default("notes.max_prompt_tokens", 128_000)?
            .set_default("notes.save_thinking", true)?
            .set_default("notes.timeout_secs", 3600)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings = builder.build().context("failed to load configuration")?;
        settings
            .try_deserialize()
            .context("configuration did not match the expected shape")
    }

    /// The configured placeholder anchor as a timestamp.
    pub fn default_start_time(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.pipeline.default_start_time, "%Y-%m-%d %H:%M:%S")
            .with_context(|| {
                format!(
                    "invalid pipeline.default_start_time: {}",
                    self.pipeline.default_start_time
                )
            })
    }
}
