//! Audio asset discovery, conversion, and per-speaker recombination
//!
//! - `naming`: the filename-pattern-as-schema, isolated in one place
//! - `convert`: idempotent m4a -> 16 kHz mono WAV conversion via ffmpeg
//! - `combine`: grouping split recordings and joining them per speaker
//! - `vad`: voice-activity check used to skip silent files

pub mod combine;
pub mod convert;
pub mod naming;
pub mod vad;

pub use combine::{combine_speaker_parts, group_speaker_parts, AudioJoiner, FfmpegJoiner};
pub use convert::{prepare_meeting_audio, AUDIO_RECORD_DIR};
pub use naming::{parse_speaker_filename, SpeakerFilename, SpeakerLabel};
pub use vad::{has_speech, VadParams};
