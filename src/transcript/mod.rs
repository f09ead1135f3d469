//! Transcript data model, interleaving, and serialization
//!
//! This module owns the core of the pipeline:
//! - `Segment` / `SegmentTime`: timestamped, speaker-attributed spans
//! - `interleave`: merging per-speaker lists into one time-ordered sequence
//! - `serialize_transcript` / `write_atomic`: the persisted transcript format

mod interleave;
mod segment;
mod writer;

pub use interleave::interleave;
pub use segment::{format_offset, MeetingStart, Segment, SegmentTime};
pub use writer::{serialize_transcript, write_atomic};
