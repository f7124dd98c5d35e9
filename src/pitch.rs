//! # Pitch Model
//!
//! Letters, pitch classes and spelled pitches.
//!
//! Pitch names follow scientific pitch notation: a letter, any number of accidentals and an
//! octave number, where C4 is middle C (MIDI 60). Sharps are written `#`; flats may be written
//! `b` or `-` on input and are always rendered as `b`.
//!
//! ```rust
//! use chord_roman::pitch::Pitch;
//!
//! let p = Pitch::parse("B-3").unwrap();
//! assert_eq!(p.to_string(), "Bb3");
//! assert_eq!(p.midi(), Some(58));
//! assert_eq!(Pitch::from_midi(61).to_string(), "C#4");
//! ```

use std::fmt;

/// The seven natural note letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Letter {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Parse a letter, ignoring case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Semitones above C of the natural note.
    pub fn semitone(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Diatonic step above C (C = 0 ... B = 6).
    pub fn step(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }
}

/// A letter plus alteration, independent of octave (e.g. `F#`, `Bb`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PitchClass {
    pub letter: Letter,
    pub alter: i8,
}

impl PitchClass {
    pub fn new(letter: Letter, alter: i8) -> Self {
        Self { letter, alter }
    }

    /// Semitone of this pitch class within the octave (0-11).
    pub fn semitone(&self) -> u8 {
        (self.letter.semitone() + self.alter as i32).rem_euclid(12) as u8
    }

    /// Spell a semitone (taken modulo 12) with sharps or flats.
    pub fn from_semitone(semitone: i32, prefer_flat: bool) -> Self {
        // 0=C, 1=C#/Db, 2=D, 3=D#/Eb, 4=E, 5=F, 6=F#/Gb, 7=G, 8=G#/Ab, 9=A, 10=A#/Bb, 11=B
        let (letter, alter) = match semitone.rem_euclid(12) {
            0 => (Letter::C, 0),
            1 => if prefer_flat { (Letter::D, -1) } else { (Letter::C, 1) },
            2 => (Letter::D, 0),
            3 => if prefer_flat { (Letter::E, -1) } else { (Letter::D, 1) },
            4 => (Letter::E, 0),
            5 => (Letter::F, 0),
            6 => if prefer_flat { (Letter::G, -1) } else { (Letter::F, 1) },
            7 => (Letter::G, 0),
            8 => if prefer_flat { (Letter::A, -1) } else { (Letter::G, 1) },
            9 => (Letter::A, 0),
            10 => if prefer_flat { (Letter::B, -1) } else { (Letter::A, 1) },
            _ => (Letter::B, 0),
        };
        Self { letter, alter }
    }

    /// Parse a pitch class like "C", "f#", "Bb", "B-" or "E--".
    ///
    /// The whole string must be consumed. Letter case is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let (class, rest) = Self::parse_prefix(s)?;
        if rest.is_empty() {
            Some(class)
        } else {
            None
        }
    }

    /// Parse a letter and its accidentals, returning the unconsumed remainder.
    fn parse_prefix(s: &str) -> Option<(Self, &str)> {
        let mut chars = s.char_indices();
        let (_, first) = chars.next()?;
        let letter = Letter::from_char(first)?;
        let mut alter: i8 = 0;
        let mut end = first.len_utf8();
        for (i, c) in chars {
            match c {
                '#' => alter = alter.checked_add(1)?,
                'b' | '-' => alter = alter.checked_sub(1)?,
                _ => {
                    end = i;
                    return Some((Self { letter, alter }, &s[end..]));
                }
            }
            end = i + c.len_utf8();
        }
        Some((Self { letter, alter }, &s[end..]))
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        let sign = if self.alter > 0 { "#" } else { "b" };
        for _ in 0..self.alter.unsigned_abs() {
            f.write_str(sign)?;
        }
        Ok(())
    }
}

/// A spelled pitch with an octave (e.g. `C#4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: i8,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i8) -> Self {
        Self { class, octave }
    }

    /// Spell a MIDI note number using sharps.
    pub fn from_midi(midi: u8) -> Self {
        let midi = midi as i32;
        Self {
            class: PitchClass::from_semitone(midi, false),
            octave: (midi / 12 - 1) as i8,
        }
    }

    /// Parse a pitch name like "C4", "F#3", "Bb2", "B-2" or "C#-1".
    ///
    /// A `-` before the octave digits is read as a minus sign when that gives a pitch in
    /// MIDI range (`C-1` is key 0), otherwise as a flat (`B-2` is Bb2).
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some((class, digits)) = name.rsplit_once('-') {
            if let (Some(class), Some(octave)) = (PitchClass::parse(class), parse_octave(digits)) {
                let pitch = Self {
                    class,
                    octave: -octave,
                };
                if pitch.midi().is_some() {
                    return Some(pitch);
                }
            }
        }

        let (class, rest) = PitchClass::parse_prefix(name)?;
        let octave = parse_octave(rest)?;
        Some(Self { class, octave })
    }

    /// MIDI note number, or `None` when the pitch falls outside 0-127.
    pub fn midi(&self) -> Option<u8> {
        let value = (self.octave as i32 + 1) * 12
            + self.class.letter.semitone()
            + self.class.alter as i32;
        u8::try_from(value).ok().filter(|v| *v <= 127)
    }

    /// Position on the staff counted in diatonic steps, used for generic intervals.
    pub fn diatonic_number(&self) -> i32 {
        self.octave as i32 * 7 + self.class.letter.step()
    }
}

fn parse_octave(digits: &str) -> Option<i8> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}
