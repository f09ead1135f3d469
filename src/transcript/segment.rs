use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Wall-clock anchor for a meeting. All segment timestamps of one meeting
/// are anchored to the same value.
pub type MeetingStart = NaiveDateTime;

/// A point in time within a transcript.
///
/// Segments start out with model-relative offsets (seconds from the start of
/// the recording) and are shifted to absolute wall-clock timestamps when a
/// meeting anchor is known. A single meeting never mixes the two regimes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentTime {
    /// Anchored wall-clock timestamp
    Absolute(NaiveDateTime),
    /// Offset in seconds from the start of the recording
    Relative(f64),
}

impl SegmentTime {
    /// Build a segment time from a model-relative offset, anchoring it when a
    /// meeting start is supplied.
    pub fn from_offset(offset_secs: f64, anchor: Option<MeetingStart>) -> Self {
        match anchor {
            Some(start) => {
                let micros = (offset_secs * 1_000_000.0).round() as i64;
                SegmentTime::Absolute(start + chrono::Duration::microseconds(micros))
            }
            None => SegmentTime::Relative(offset_secs),
        }
    }

    /// Total order over segment times, used for interleaving.
    ///
    /// Mixed regimes never occur within one meeting; the cross-regime arms
    /// exist only so the comparison is total.
    pub fn order(&self, other: &SegmentTime) -> Ordering {
        match (self, other) {
            (SegmentTime::Absolute(a), SegmentTime::Absolute(b)) => a.cmp(b),
            (SegmentTime::Relative(a), SegmentTime::Relative(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SegmentTime::Absolute(_), SegmentTime::Relative(_)) => Ordering::Less,
            (SegmentTime::Relative(_), SegmentTime::Absolute(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for SegmentTime {
    /// Render for the transcript file: absolute times as `HH:MM:SS`,
    /// relative offsets as a duration from zero (`H:MM:SS`, with microseconds
    /// appended only when the offset is fractional).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentTime::Absolute(dt) => write!(f, "{}", dt.format("%H:%M:%S")),
            SegmentTime::Relative(secs) => write!(f, "{}", format_offset(*secs)),
        }
    }
}

/// Format a duration-from-zero offset as `H:MM:SS` or `H:MM:SS.ffffff`.
pub fn format_offset(secs: f64) -> String {
    let total_micros = (secs * 1_000_000.0).round() as i64;
    let micros = total_micros.rem_euclid(1_000_000);
    let total_secs = total_micros.div_euclid(1_000_000);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if micros == 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}:{:02}.{:06}", hours, minutes, seconds, micros)
    }
}

/// One recognized span of speech, attributed to a speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// When the span starts (`end >= start`)
    pub start: SegmentTime,

    /// When the span ends
    pub end: SegmentTime,

    /// Recognized text, trimmed. May be empty: empty-text segments are kept
    /// as timing markers and serialized as-is.
    pub text: String,

    /// Speaker owning this segment
    pub speaker: String,
}
