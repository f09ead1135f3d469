// Tests for transcript interleaving: global ordering, stability, and the
// all-empty edge case.

use meeting_scribe::{interleave, Segment, SegmentTime};
use std::collections::BTreeMap;

fn seg(start: f64, end: f64, speaker: &str, text: &str) -> Segment {
    Segment {
        start: SegmentTime::Relative(start),
        end: SegmentTime::Relative(end),
        text: text.to_string(),
        speaker: speaker.to_string(),
    }
}

#[test]
fn test_interleave_orders_by_start_time() {
    let mut transcriptions = BTreeMap::new();
    transcriptions.insert("A".to_string(), vec![seg(5.0, 6.0, "A", "x")]);
    transcriptions.insert(
        "B".to_string(),
        vec![seg(2.0, 3.0, "B", "y"), seg(8.0, 9.0, "B", "z")],
    );

    let merged = interleave(&transcriptions);

    let order: Vec<(&str, &str)> = merged
        .iter()
        .map(|s| (s.speaker.as_str(), s.text.as_str()))
        .collect();
    assert_eq!(order, vec![("B", "y"), ("A", "x"), ("B", "z")]);
}

#[test]
fn test_interleave_is_stable_on_ties() {
    // Identical start times keep their flattening order (speaker order,
    // then per-speaker order)
    let mut transcriptions = BTreeMap::new();
    transcriptions.insert("A".to_string(), vec![seg(5.0, 6.0, "A", "first")]);
    transcriptions.insert("B".to_string(), vec![seg(5.0, 6.0, "B", "second")]);

    let merged = interleave(&transcriptions);

    assert_eq!(merged[0].speaker, "A");
    assert_eq!(merged[1].speaker, "B");
}

#[test]
fn test_interleave_is_deterministic() {
    let mut transcriptions = BTreeMap::new();
    transcriptions.insert(
        "A".to_string(),
        vec![seg(1.0, 2.0, "A", "a1"), seg(3.0, 4.0, "A", "a2")],
    );
    transcriptions.insert("B".to_string(), vec![seg(1.0, 2.0, "B", "b1")]);

    assert_eq!(interleave(&transcriptions), interleave(&transcriptions));
}

#[test]
fn test_interleave_handles_empty_input() {
    let empty: BTreeMap<String, Vec<Segment>> = BTreeMap::new();
    assert!(interleave(&empty).is_empty());

    // Speakers with zero segments (silent files) contribute nothing
    let mut silent = BTreeMap::new();
    silent.insert("A".to_string(), Vec::new());
    silent.insert("B".to_string(), vec![seg(1.0, 2.0, "B", "hi")]);
    let merged = interleave(&silent);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].speaker, "B");
}
