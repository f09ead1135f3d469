use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;

/// Voice-activity detection parameters.
#[derive(Debug, Clone)]
pub struct VadParams {
    /// Normalized RMS energy threshold for a window to count as voiced
    pub threshold: f64,
    /// Minimum cumulative voiced audio required to call a file "speech"
    pub min_speech_ms: u64,
    /// Analysis window length
    pub window_ms: u64,
}

impl Default for VadParams {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            min_speech_ms: 250,
            window_ms: 30,
        }
    }
}

/// Check whether a WAV file contains speech.
///
/// Energy-based detector: RMS over fixed windows against a threshold,
/// requiring a minimum cumulative voiced duration. This only gates whether
/// the recognizer is invoked at all; a silent file yields zero segments,
/// never an error.
pub fn has_speech(path: &Path, params: &VadParams) -> Result<bool> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read audio samples from {}", path.display()))?;

    if samples.is_empty() {
        return Ok(false);
    }

    let window_len =
        ((spec.sample_rate as u64 * spec.channels as u64 * params.window_ms) / 1000).max(1) as usize;

    let mut voiced_ms: u64 = 0;
    for window in samples.chunks(window_len) {
        let energy: f64 = window
            .iter()
            .map(|&s| {
                let normalized = s as f64 / i16::MAX as f64;
                normalized * normalized
            })
            .sum();
        let rms = (energy / window.len() as f64).sqrt();
        if rms > params.threshold {
            voiced_ms += params.window_ms;
            if voiced_ms >= params.min_speech_ms {
                return Ok(true);
            }
        }
    }

    Ok(false)
}
