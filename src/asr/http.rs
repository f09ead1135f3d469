use anyhow::{bail, Context, Result};
use reqwest::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::{RawSegment, SpeechRecognizer};
use crate::config::AsrConfig;

/// Segment as returned by the ASR server.
#[derive(Debug, Deserialize)]
struct HttpSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Transcription response body.
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    segments: Vec<HttpSegment>,
}

/// Speech recognizer backed by an HTTP ASR server.
///
/// Uploads the WAV file as multipart form data and expects timestamped
/// segments back as JSON. The server owns the model; `release` asks it to
/// unload so the accelerator is free before the notes phase.
pub struct HttpRecognizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl HttpRecognizer {
    pub fn new(config: &AsrConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build ASR HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for HttpRecognizer {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<RawSegment>> {
        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("failed to read audio file {}", audio.display()))?;

        let filename = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let part = multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str("audio/wav")
            .context("failed to build multipart body")?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("timestamps", "true");

        let url = format!("{}/v1/transcribe", self.endpoint);
        debug!("POST {} ({})", url, audio.display());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("ASR request failed for {}", audio.display()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "ASR server returned {} for {}: {}",
                status,
                audio.display(),
                body
            );
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .with_context(|| format!("failed to parse ASR response for {}", audio.display()))?;

        Ok(parsed
            .segments
            .into_iter()
            .map(|s| RawSegment {
                start: s.start,
                end: s.end,
                text: s.text,
            })
            .collect())
    }

    async fn release(&self) -> Result<()> {
        // Best effort: the run must not fail because cleanup did
        let url = format!("{}/v1/models/unload", self.endpoint);
        match self.client.post(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("ASR model unloaded");
            }
            Ok(response) => {
                warn!("ASR unload request returned {}", response.status());
            }
            Err(e) => {
                warn!("ASR unload request failed: {}", e);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
