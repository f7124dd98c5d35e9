//! # MusicXML Reader
//!
//! Reads `score-partwise` MusicXML into a flat [`Score`].
//!
//! ## Timing Rules
//! - Every `<part>` starts its own cursor at 0
//! - `<divisions>` sets how many duration units make a quarter note
//! - A note advances the cursor by its `<duration>`, unless it carries `<chord/>`, in which
//!   case it starts together with the previous note
//! - `<rest/>` advances the cursor without producing a note
//! - `<backup>` and `<forward>` move the cursor for multi-voice writing
//! - Grace notes have no duration and are ignored
//! - A note that ends a `<tie>` lengthens the note it is tied from instead of sounding again
//!
//! The first `<sound tempo="..">` gives the tempo; `<work-title>` (or `<movement-title>`)
//! gives the title.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::pitch::{Letter, Pitch, PitchClass};
use crate::score::{Score, ScoreNote};

/// Fields collected while inside a `<note>` element
#[derive(Debug, Default)]
struct NoteBuilder {
    step: Option<Letter>,
    alter: i8,
    octave: Option<i8>,
    duration: f64,
    chord: bool,
    rest: bool,
    grace: bool,
    tie_start: bool,
    tie_stop: bool,
}

#[derive(Debug, Default)]
struct PartwiseReader {
    score: Score,
    saw_root: bool,
    part: usize,
    parts_seen: usize,
    in_part: bool,
    divisions: f64,
    /// Cursor in quarter notes within the current part
    cursor: f64,
    last_onset: f64,
    note: Option<NoteBuilder>,
    /// Duration (in divisions) of the `<backup>` or `<forward>` being read
    shift: Option<f64>,
    /// (part, midi) -> index of a note waiting for its tie to continue
    open_ties: HashMap<(usize, u8), usize>,
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, String> {
    match e.try_get_attribute(name).map_err(|err| err.to_string())? {
        Some(attr) => {
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

impl PartwiseReader {
    fn new() -> Self {
        Self {
            divisions: 1.0,
            ..Default::default()
        }
    }

    fn start(&mut self, name: &str, e: &BytesStart<'_>) -> Result<(), String> {
        match name {
            "score-partwise" => self.saw_root = true,
            "score-timewise" => {
                return Err("score-timewise MusicXML is not supported".to_string());
            }
            "part" if !self.in_part => {
                self.part = self.parts_seen;
                self.parts_seen += 1;
                self.in_part = true;
                self.divisions = 1.0;
                self.cursor = 0.0;
                self.last_onset = 0.0;
            }
            "note" => self.note = Some(NoteBuilder::default()),
            "chord" => self.with_note(|n| n.chord = true),
            "rest" => self.with_note(|n| n.rest = true),
            "grace" => self.with_note(|n| n.grace = true),
            "tie" => {
                let kind = attribute(e, "type")?;
                match kind.as_deref() {
                    Some("start") => self.with_note(|n| n.tie_start = true),
                    Some("stop") => self.with_note(|n| n.tie_stop = true),
                    _ => {}
                }
            }
            "backup" | "forward" => self.shift = Some(0.0),
            "sound" => {
                if self.score.tempo.is_none() {
                    if let Some(tempo) = attribute(e, "tempo")? {
                        let bpm: f64 = tempo
                            .trim()
                            .parse()
                            .map_err(|_| format!("Invalid tempo '{}'", tempo))?;
                        if bpm > 0.0 {
                            self.score.tempo = Some(bpm);
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn with_note(&mut self, f: impl FnOnce(&mut NoteBuilder)) {
        if let Some(note) = self.note.as_mut() {
            f(note);
        }
    }

    fn text(&mut self, path: &[String], text: &str) -> Result<(), String> {
        let (Some(name), parent) = (path.last(), path.iter().rev().nth(1)) else {
            return Ok(());
        };
        let parent = parent.map(String::as_str).unwrap_or("");
        let number = || -> Result<f64, String> {
            text.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid <{}> value '{}'", name, text))
        };

        match (parent, name.as_str()) {
            ("work", "work-title") | (_, "movement-title") => {
                if self.score.title.is_none() && !text.trim().is_empty() {
                    self.score.title = Some(text.trim().to_string());
                }
            }
            ("attributes", "divisions") => {
                let divisions = number()?;
                if divisions <= 0.0 {
                    return Err(format!("Invalid <divisions> value '{}'", text));
                }
                self.divisions = divisions;
            }
            ("pitch", "step") => {
                let step = text
                    .trim()
                    .chars()
                    .next()
                    .and_then(Letter::from_char)
                    .ok_or_else(|| format!("Invalid <step> value '{}'", text))?;
                self.with_note(|n| n.step = Some(step));
            }
            ("pitch", "alter") => {
                let alter = number()?.round() as i8;
                self.with_note(|n| n.alter = alter);
            }
            ("pitch", "octave") => {
                let octave = number()? as i8;
                self.with_note(|n| n.octave = Some(octave));
            }
            ("note", "duration") => {
                let duration = number()?;
                self.with_note(|n| n.duration = duration);
            }
            ("backup", "duration") | ("forward", "duration") => {
                self.shift = Some(number()?);
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &str) {
        match name {
            "part" => self.in_part = false,
            "note" => {
                if let Some(note) = self.note.take() {
                    self.finish_note(note);
                }
            }
            "backup" => {
                let shift = self.shift.take().unwrap_or(0.0) / self.divisions;
                self.cursor = (self.cursor - shift).max(0.0);
            }
            "forward" => {
                let shift = self.shift.take().unwrap_or(0.0) / self.divisions;
                self.cursor += shift;
            }
            _ => {}
        }
    }

    fn finish_note(&mut self, note: NoteBuilder) {
        if note.grace {
            return;
        }
        let duration = note.duration / self.divisions;
        let onset = if note.chord {
            self.last_onset
        } else {
            let onset = self.cursor;
            self.cursor += duration;
            self.last_onset = onset;
            onset
        };
        if note.rest {
            return;
        }
        let (Some(step), Some(octave)) = (note.step, note.octave) else {
            // Unpitched percussion
            return;
        };
        let pitch = Pitch::new(PitchClass::new(step, note.alter), octave);
        let Some(midi) = pitch.midi() else {
            return;
        };

        if note.tie_stop {
            if let Some(index) = self.open_ties.remove(&(self.part, midi)) {
                let tied = &mut self.score.notes[index];
                tied.duration = (onset + duration - tied.offset).max(tied.duration);
                if note.tie_start {
                    self.open_ties.insert((self.part, midi), index);
                }
                return;
            }
        }

        self.score.notes.push(ScoreNote {
            pitch,
            offset: onset,
            duration,
            part: self.part,
        });
        if note.tie_start {
            self.open_ties
                .insert((self.part, midi), self.score.notes.len() - 1);
        }
    }
}

/// Parse MusicXML text into a score.
pub fn read_musicxml(text: &str) -> Result<Score, String> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut state = PartwiseReader::new();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                state.start(&name, &e)?;
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                state.start(&name, &e)?;
                state.end(&name);
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                state.text(&path, &text)?;
            }
            Ok(Event::End(_)) => {
                if let Some(name) = path.pop() {
                    state.end(&name);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ));
            }
            _ => {}
        }
    }

    if !state.saw_root {
        return Err("Not a MusicXML score-partwise document".to_string());
    }

    let mut score = state.score;
    score.sort();
    Ok(score)
}
