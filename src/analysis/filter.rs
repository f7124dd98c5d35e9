//! Chord filtering
//!
//! Decides which reduced-stream elements are worth a Roman numeral.

use std::collections::HashSet;

use crate::theory::{CandidateGroup, StreamElement};

/// Number of distinct pitch names in a group.
pub fn distinct_pitches(group: &CandidateGroup) -> usize {
    group
        .pitch_names
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .len()
}

/// Return the group if the element is a chord with at least `min_notes` distinct pitches.
///
/// Rests and single notes never qualify. A threshold of 2 admits dyads; thresholds of
/// 0 or 1 admit every chord.
///
/// # Example
/// ```
/// use chord_roman::analysis::harmonic_chord;
/// use chord_roman::theory::{CandidateGroup, StreamElement};
///
/// let dyad = StreamElement::Chord(CandidateGroup::new(0.0, 1.0, &["C4", "G4"]));
/// assert!(harmonic_chord(&dyad, 3).is_none());
/// assert!(harmonic_chord(&dyad, 2).is_some());
/// ```
pub fn harmonic_chord(element: &StreamElement, min_notes: usize) -> Option<&CandidateGroup> {
    match element {
        StreamElement::Chord(group) if distinct_pitches(group) >= min_notes => Some(group),
        _ => None,
    }
}

/// Whether the element qualifies as an analyzable chord.
pub fn is_harmonic_chord(element: &StreamElement, min_notes: usize) -> bool {
    harmonic_chord(element, min_notes).is_some()
}
