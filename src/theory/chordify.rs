//! Harmonic reduction ("chordify")
//!
//! Every note onset and release across all parts is a slice boundary. For each pair of
//! neighbouring boundaries, the notes sounding through the whole slice form one element:
//! - no notes: `Rest`
//! - one distinct pitch: `Note`
//! - two or more distinct pitches: `Chord`
//!
//! Pitches within a slice are deduplicated by MIDI number and listed lowest first.
//! Zero-length notes join the slice that starts at their onset.

use super::{CandidateGroup, StreamElement};
use crate::score::{Score, ScoreNote};

/// Boundaries closer than this are treated as the same instant
const EPSILON: f64 = 1e-9;

/// Notes ordered by onset, for the sweep in [`chordify`].
fn by_onset<'a>(notes: impl Iterator<Item = &'a ScoreNote>) -> Vec<&'a ScoreNote> {
    let mut sorted: Vec<&ScoreNote> = notes.collect();
    sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    sorted
}

/// Reduce a score to a time-ordered stream of simultaneous-pitch groups.
///
/// Single sweep over the boundaries: sustained notes join an active set at their onset
/// and leave it once they stop covering the slice.
pub fn chordify(score: &Score) -> Vec<StreamElement> {
    let mut times: Vec<f64> = score
        .notes
        .iter()
        .flat_map(|n| [n.offset, n.end()])
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup_by(|a, b| (*a - *b).abs() < EPSILON);

    let sustained = by_onset(score.notes.iter().filter(|n| n.duration > 0.0));
    let instants = by_onset(score.notes.iter().filter(|n| n.duration <= 0.0));
    let mut next_sustained = 0;
    let mut next_instant = 0;
    let mut active: Vec<&ScoreNote> = Vec::new();

    let mut elements = Vec::with_capacity(times.len());
    for (i, &start) in times.iter().enumerate() {
        let end = times.get(i + 1).copied();

        while let Some(note) = sustained.get(next_sustained) {
            if note.offset >= start + EPSILON {
                break;
            }
            active.push(*note);
            next_sustained += 1;
        }

        let mut sounding: Vec<&ScoreNote> = match end {
            Some(end) => {
                active.retain(|n| n.end() > end - EPSILON);
                active.clone()
            }
            None => Vec::new(),
        };

        // Zero-length notes join the slice starting at their onset
        while let Some(note) = instants.get(next_instant) {
            if note.offset >= start + EPSILON {
                break;
            }
            if (note.offset - start).abs() < EPSILON {
                sounding.push(*note);
            }
            next_instant += 1;
        }

        let duration = end.map_or(0.0, |end| end - start);
        if sounding.is_empty() {
            if end.is_some() {
                elements.push(StreamElement::Rest { offset: start, duration });
            }
            continue;
        }

        sounding.sort_by_key(|n| n.pitch.midi());
        sounding.dedup_by_key(|n| n.pitch.midi());

        let element = if sounding.len() == 1 {
            StreamElement::Note {
                offset: start,
                duration,
                pitch: sounding[0].pitch.to_string(),
            }
        } else {
            StreamElement::Chord(CandidateGroup {
                offset: start,
                duration,
                pitch_names: sounding.iter().map(|n| n.pitch.to_string()).collect(),
            })
        };
        elements.push(element);
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Pitch;

    fn note(name: &str, offset: f64, duration: f64) -> ScoreNote {
        ScoreNote {
            pitch: Pitch::parse(name).unwrap(),
            offset,
            duration,
            part: 0,
        }
    }

    fn chord_names(element: &StreamElement) -> Vec<String> {
        match element {
            StreamElement::Chord(group) => group.pitch_names.clone(),
            other => panic!("expected chord, got {:?}", other),
        }
    }

    #[test]
    fn test_block_chords() {
        let score = Score {
            notes: vec![
                note("C4", 0.0, 1.0),
                note("E4", 0.0, 1.0),
                note("G4", 0.0, 1.0),
                note("F4", 1.0, 1.0),
                note("A4", 1.0, 1.0),
                note("C5", 1.0, 1.0),
            ],
            ..Default::default()
        };
        let stream = chordify(&score);
        assert_eq!(stream.len(), 2);
        assert_eq!(chord_names(&stream[0]), vec!["C4", "E4", "G4"]);
        assert_eq!(chord_names(&stream[1]), vec!["F4", "A4", "C5"]);
        assert_eq!(stream[1].offset(), 1.0);
    }

    #[test]
    fn test_held_bass_under_moving_melody() {
        let score = Score {
            notes: vec![
                note("C3", 0.0, 2.0),
                note("E4", 0.0, 1.0),
                note("G4", 0.0, 1.0),
                note("F4", 1.0, 1.0),
            ],
            ..Default::default()
        };
        let stream = chordify(&score);
        assert_eq!(stream.len(), 2);
        assert_eq!(chord_names(&stream[0]), vec!["C3", "E4", "G4"]);
        assert_eq!(chord_names(&stream[1]), vec!["C3", "F4"]);
        match &stream[1] {
            StreamElement::Chord(group) => assert_eq!(group.duration, 1.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_gaps_become_rests_and_single_notes_stay_notes() {
        let score = Score {
            notes: vec![note("C4", 0.0, 1.0), note("D4", 2.0, 1.0)],
            ..Default::default()
        };
        let stream = chordify(&score);
        assert_eq!(stream.len(), 3);
        assert!(matches!(stream[0], StreamElement::Note { .. }));
        assert!(matches!(stream[1], StreamElement::Rest { offset, duration } if offset == 1.0 && duration == 1.0));
        assert!(matches!(stream[2], StreamElement::Note { .. }));
    }

    #[test]
    fn test_doubled_pitches_collapse() {
        let score = Score {
            notes: vec![
                note("C4", 0.0, 1.0),
                note("C4", 0.0, 1.0),
                note("G4", 0.0, 1.0),
            ],
            ..Default::default()
        };
        let stream = chordify(&score);
        assert_eq!(chord_names(&stream[0]), vec!["C4", "G4"]);
    }

    #[test]
    fn test_zero_length_notes_form_their_own_group() {
        let score = Score {
            notes: vec![
                note("C4", 0.0, 0.0),
                note("E4", 0.0, 0.0),
                note("G4", 0.0, 0.0),
            ],
            ..Default::default()
        };
        let stream = chordify(&score);
        assert_eq!(stream.len(), 1);
        match &stream[0] {
            StreamElement::Chord(group) => {
                assert_eq!(group.duration, 0.0);
                assert_eq!(group.pitch_names.len(), 3);
            }
            other => panic!("expected chord, got {:?}", other),
        }
    }

    #[test]
    fn test_overlapping_entries_and_releases() {
        // Staggered voices: every boundary changes the sounding set
        let score = Score {
            notes: vec![
                note("E4", 1.0, 3.0),
                note("C3", 0.0, 4.0),
                note("G4", 2.0, 1.0),
                note("B4", 0.0, 0.0),
            ],
            ..Default::default()
        };
        let stream = chordify(&score);
        assert_eq!(stream.len(), 4);
        assert_eq!(chord_names(&stream[0]), vec!["C3", "B4"]);
        assert_eq!(chord_names(&stream[1]), vec!["C3", "E4"]);
        assert_eq!(chord_names(&stream[2]), vec!["C3", "E4", "G4"]);
        assert_eq!(chord_names(&stream[3]), vec!["C3", "E4"]);
        assert_eq!(stream[3].offset(), 3.0);
    }

    #[test]
    fn test_long_score_keeps_every_slice() {
        let notes: Vec<ScoreNote> = (0..2000)
            .flat_map(|i| {
                let offset = i as f64 * 0.5;
                [note("C4", offset, 0.5), note("E4", offset, 0.5), note("G4", offset, 0.5)]
            })
            .collect();
        let stream = chordify(&Score {
            notes,
            ..Default::default()
        });
        assert_eq!(stream.len(), 2000);
        assert!(stream.iter().all(|e| matches!(e, StreamElement::Chord(g) if g.pitch_names.len() == 3)));
    }

    #[test]
    fn test_empty_score() {
        assert!(chordify(&Score::default()).is_empty());
    }
}
