use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::document::NotesDocument;
use super::{NotesBackend, StructuredNotes};
use crate::config::NotesConfig;

const SYSTEM_PROMPT: &str = include_str!("../../prompts/system_prompt.txt");
const USER_PROMPT_TEMPLATE: &str = include_str!("../../prompts/user_prompt.txt");

/// Ollama generate request.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    think: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<u64>,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_ctx: u64,
}

/// Ollama generate response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    thinking: Option<String>,
    #[serde(default)]
    total_duration: Option<u64>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

/// Notes backend talking to a running Ollama server.
pub struct OllamaNotes {
    client: reqwest::Client,
    base_url: String,
    model: String,
    think: String,
    max_prompt_tokens: u64,
}

impl OllamaNotes {
    pub fn new(config: &NotesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build Ollama HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            think: config.think.clone(),
            max_prompt_tokens: config.max_prompt_tokens,
        })
    }
}

#[async_trait::async_trait]
impl NotesBackend for OllamaNotes {
    async fn structure(&self, transcript: &str) -> Result<StructuredNotes> {
        let prompt = USER_PROMPT_TEMPLATE.replace("{transcript}", transcript);

        // Rough over-estimate; the ceiling exists to fail fast instead of
        // silently truncating a transcript the model cannot hold.
        let approx_tokens = ((prompt.len() + SYSTEM_PROMPT.len()) as f64 / 2.5) as u64;
        info!("Approximate tokens: {}", approx_tokens);
        if approx_tokens > self.max_prompt_tokens {
            bail!(
                "transcript is too long (~{} tokens, budget is {}); please shorten the transcript",
                approx_tokens,
                self.max_prompt_tokens
            );
        }

        // num_ctx must cover input + thinking + output; 4x input is a safe minimum
        let num_ctx = (approx_tokens * 4).max(8192);

        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            system: SYSTEM_PROMPT,
            stream: false,
            think: Some(&self.think),
            keep_alive: None,
            options: GenerateOptions { num_ctx },
        };

        let url = format!("{}/api/generate", self.base_url);
        debug!("POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Ollama request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Ollama returned {}: {}", status, body);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("failed to parse Ollama response body")?;

        if let Some(total) = parsed.total_duration {
            info!("Response time: {:.2} minutes", total as f64 / 1e9 / 60.0);
        }
        if let Some(input_tokens) = parsed.prompt_eval_count {
            info!("Actual input tokens: {}", input_tokens);
            if approx_tokens <= input_tokens {
                warn!("Approximate token count underestimated the actual input tokens");
            }
        }
        if let Some(output_tokens) = parsed.eval_count {
            info!("Output tokens: {}", output_tokens);
        }

        // The model sometimes leaves the JSON in the thinking block instead
        let mut value = extract_json(&parsed.response);
        if value.is_none() {
            if let Some(thinking) = &parsed.thinking {
                value = extract_json(thinking);
            }
        }

        let Some(value) = value else {
            bail!(
                "could not parse JSON from Ollama response. Raw response:\n{:?}",
                parsed.response
            );
        };

        let document: NotesDocument = serde_json::from_value(value)
            .context("notes JSON did not match the expected header/topics/action_items/metanotes shape")?;

        Ok(StructuredNotes {
            document,
            thinking: parsed.thinking,
        })
    }

    async fn release(&self) -> Result<()> {
        // keep_alive 0 asks Ollama to unload the model immediately; cleanup
        // failure must not fail the run
        let request = GenerateRequest {
            model: &self.model,
            prompt: "",
            system: "",
            stream: false,
            think: None,
            keep_alive: Some(0),
            options: GenerateOptions { num_ctx: 0 },
        };

        let url = format!("{}/api/generate", self.base_url);
        match self.client.post(&url).json(&request).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Ollama model unloaded");
            }
            Ok(response) => {
                warn!("Ollama unload request returned {}", response.status());
            }
            Err(e) => {
                warn!("Ollama unload request failed: {}", e);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*\n?(.*?)```").expect("fence pattern is a valid regex")
});

/// Best-effort extraction of a JSON object from model output.
///
/// Handles common quirks in order: markdown code fences around the object,
/// then a direct parse, then the outermost `{...}` span embedded in prose.
/// Returns `None` when no JSON object can be recovered.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    if text.trim().is_empty() {
        return None;
    }

    let fenced;
    let mut candidate = text;
    if let Some(caps) = CODE_FENCE.captures(text) {
        fenced = caps[1].trim().to_string();
        candidate = &fenced;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Outermost braces: first '{' to last '}'
    if let (Some(open), Some(close)) = (candidate.find('{'), candidate.rfind('}')) {
        if close > open {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&candidate[open..=close]) {
                if value.is_object() {
                    return Some(value);
                }
            }
        }
    }

    None
}
