//! # Standard MIDI File I/O
//!
//! Reads MIDI files into a [`Score`] and writes short note lists back out (used for the
//! per-chord snippets).
//!
//! ## Reading
//! - Only metrical timing (ticks per quarter note) is supported
//! - Note-on with velocity 0 counts as note-off
//! - Overlapping notes on the same key and channel are paired first-in, first-out
//! - Notes still sounding at the end of a track end there
//! - Channel 10 (percussion) is ignored
//! - The first tempo event gives the score tempo; the first track name gives the title
//!
//! ## Writing
//! Format 0, 480 ticks per quarter note, one tempo event, channel 1.

use std::collections::HashMap;
use std::io::Write;

use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

use crate::pitch::Pitch;
use crate::score::{Score, ScoreNote};

/// Resolution used for every file we write
pub const TICKS_PER_QUARTER: u16 = 480;

/// Zero-based channel index of General MIDI percussion
const PERCUSSION_CHANNEL: u8 = 9;

const DEFAULT_VELOCITY: u8 = 80;

/// Parse the bytes of a Standard MIDI File into a score.
pub fn read_midi(bytes: &[u8]) -> Result<Score, String> {
    let smf = Smf::parse(bytes).map_err(|e| e.to_string())?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int(),
        Timing::Timecode(..) => {
            return Err("SMPTE timecode timing is not supported".to_string());
        }
    };
    if ticks_per_quarter == 0 {
        return Err("Header declares 0 ticks per quarter note".to_string());
    }
    let to_quarters = |tick: u64| tick as f64 / ticks_per_quarter as f64;

    let mut score = Score::default();
    let mut first_tempo: Option<(u64, u32)> = None;

    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        // (channel, key) -> onset ticks still waiting for a note-off
        let mut sounding: HashMap<(u8, u8), Vec<u64>> = HashMap::new();

        for event in track {
            tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Midi { channel, message } => {
                    let channel = channel.as_int();
                    if channel == PERCUSSION_CHANNEL {
                        continue;
                    }
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            sounding.entry((channel, key.as_int())).or_default().push(tick);
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            let key = key.as_int();
                            if let Some(starts) = sounding.get_mut(&(channel, key)) {
                                if !starts.is_empty() {
                                    let start = starts.remove(0);
                                    score.notes.push(ScoreNote {
                                        pitch: Pitch::from_midi(key),
                                        offset: to_quarters(start),
                                        duration: to_quarters(tick - start),
                                        part: track_index,
                                    });
                                }
                            }
                        }
                        _ => {}
                    }
                }
                TrackEventKind::Meta(MetaMessage::Tempo(micros)) => {
                    // Earliest tempo wins, whichever track it lives in
                    let micros = micros.as_int();
                    if micros > 0 && first_tempo.map_or(true, |(t, _)| tick < t) {
                        first_tempo = Some((tick, micros));
                    }
                }
                TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                    if score.title.is_none() && track_index == 0 && !name.is_empty() {
                        score.title = Some(String::from_utf8_lossy(name).trim().to_string());
                    }
                }
                _ => {}
            }
        }

        // Close anything left hanging at the end of the track
        for ((_, key), starts) in sounding {
            for start in starts {
                score.notes.push(ScoreNote {
                    pitch: Pitch::from_midi(key),
                    offset: to_quarters(start),
                    duration: to_quarters(tick - start),
                    part: track_index,
                });
            }
        }
    }

    score.tempo = first_tempo.map(|(_, micros)| 60_000_000.0 / micros as f64);
    score.sort();
    Ok(score)
}

/// A note to be written, in quarter-note units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiNote {
    pub key: u8,
    pub offset: f64,
    pub duration: f64,
}

fn to_ticks(quarters: f64) -> u64 {
    (quarters.max(0.0) * TICKS_PER_QUARTER as f64).round() as u64
}

/// Write notes as a format 0 MIDI file at the given tempo.
pub fn write_notes<W: Write>(notes: &[MidiNote], tempo_bpm: f64, out: W) -> std::io::Result<()> {
    // (tick, is_note_on, key): note-offs sort before note-ons on the same tick
    let mut timeline: Vec<(u64, bool, u8)> = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let start = to_ticks(note.offset);
        let end = to_ticks(note.offset + note.duration).max(start + 1);
        timeline.push((start, true, note.key & 0x7F));
        timeline.push((end, false, note.key & 0x7F));
    }
    timeline.sort();

    let micros_per_quarter = (60_000_000.0 / tempo_bpm.max(1.0)).round() as u32;

    let mut track = Vec::with_capacity(timeline.len() + 2);
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(micros_per_quarter.into())),
    });

    let mut last_tick = 0;
    for (tick, is_on, key) in timeline {
        let message = if is_on {
            MidiMessage::NoteOn {
                key: key.into(),
                vel: DEFAULT_VELOCITY.into(),
            }
        } else {
            MidiMessage::NoteOff {
                key: key.into(),
                vel: 0.into(),
            }
        };
        track.push(TrackEvent {
            delta: ((tick - last_tick) as u32).into(),
            kind: TrackEventKind::Midi {
                channel: 0.into(),
                message,
            },
        });
        last_tick = tick;
    }
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(TICKS_PER_QUARTER.into()),
    ));
    smf.tracks.push(track);
    smf.write_std(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(notes: &[MidiNote], tempo: f64) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_notes(notes, tempo, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_written_chord_reads_back() {
        let notes = [
            MidiNote { key: 60, offset: 0.0, duration: 2.0 },
            MidiNote { key: 64, offset: 0.0, duration: 2.0 },
            MidiNote { key: 67, offset: 0.0, duration: 2.0 },
        ];
        let score = read_midi(&encode(&notes, 120.0)).unwrap();

        assert_eq!(score.tempo, Some(120.0));
        assert_eq!(score.notes.len(), 3);
        let names: Vec<String> = score.notes.iter().map(|n| n.pitch.to_string()).collect();
        assert_eq!(names, vec!["C4", "E4", "G4"]);
        assert!(score.notes.iter().all(|n| n.offset == 0.0 && n.duration == 2.0));
    }

    #[test]
    fn test_repeated_key_is_not_merged() {
        // Same key struck twice back to back
        let notes = [
            MidiNote { key: 62, offset: 0.0, duration: 1.0 },
            MidiNote { key: 62, offset: 1.0, duration: 0.5 },
        ];
        let score = read_midi(&encode(&notes, 90.0)).unwrap();
        assert_eq!(score.notes.len(), 2);
        assert_eq!(score.notes[1].offset, 1.0);
        assert_eq!(score.notes[1].duration, 0.5);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(read_midi(b"not a midi file").is_err());
    }

    #[test]
    fn test_percussion_channel_is_ignored() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(96.into())));
        smf.tracks.push(vec![
            TrackEvent {
                delta: 0.into(),
                kind: TrackEventKind::Midi {
                    channel: PERCUSSION_CHANNEL.into(),
                    message: MidiMessage::NoteOn { key: 36.into(), vel: 100.into() },
                },
            },
            TrackEvent {
                delta: 96.into(),
                kind: TrackEventKind::Midi {
                    channel: PERCUSSION_CHANNEL.into(),
                    message: MidiMessage::NoteOff { key: 36.into(), vel: 0.into() },
                },
            },
            TrackEvent {
                delta: 0.into(),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ]);
        let mut bytes = Vec::new();
        smf.write_std(&mut bytes).unwrap();

        let score = read_midi(&bytes).unwrap();
        assert!(score.notes.is_empty());
        assert_eq!(score.tempo, None);
    }

    #[test]
    fn test_unterminated_note_ends_at_track_end() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(100.into())));
        smf.tracks.push(vec![
            TrackEvent {
                delta: 0.into(),
                kind: TrackEventKind::Midi {
                    channel: 0.into(),
                    message: MidiMessage::NoteOn { key: 60.into(), vel: 64.into() },
                },
            },
            TrackEvent {
                delta: 300.into(),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ]);
        let mut bytes = Vec::new();
        smf.write_std(&mut bytes).unwrap();

        let score = read_midi(&bytes).unwrap();
        assert_eq!(score.notes.len(), 1);
        assert_eq!(score.notes[0].duration, 3.0);
    }
}
