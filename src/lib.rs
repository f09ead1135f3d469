pub mod asr;
pub mod audio;
pub mod cli;
pub mod config;
pub mod notes;
pub mod pipeline;
pub mod transcript;

pub use asr::{transcribe_speakers, AsrBackendFactory, RawSegment, SpeechRecognizer};
pub use audio::{
    combine_speaker_parts, group_speaker_parts, parse_speaker_filename, prepare_meeting_audio,
    AudioJoiner, FfmpegJoiner, SpeakerFilename, SpeakerLabel, VadParams,
};
pub use config::Config;
pub use notes::{
    render_markdown, NotesBackend, NotesBackendFactory, NotesDocument, StructuredNotes,
};
pub use transcript::{
    interleave, serialize_transcript, write_atomic, MeetingStart, Segment, SegmentTime,
};
