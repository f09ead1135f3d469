use std::collections::BTreeMap;

use super::segment::Segment;

/// Merge per-speaker segment lists into one globally time-ordered sequence.
///
/// Segments are flattened in speaker order (the map is sorted by speaker
/// label) and stably sorted by start time, so ties keep their flattening
/// order and repeated runs over identical input produce identical output.
///
/// No deduplication or overlap resolution happens here: overlapping speech
/// from two speakers appears as two adjacent entries in source order.
pub fn interleave(transcriptions: &BTreeMap<String, Vec<Segment>>) -> Vec<Segment> {
    let mut all_segments: Vec<Segment> = transcriptions
        .values()
        .flat_map(|segments| segments.iter().cloned())
        .collect();

    // Vec::sort_by is stable
    all_segments.sort_by(|a, b| a.start.order(&b.start));
    all_segments
}
