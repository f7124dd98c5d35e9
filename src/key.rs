//! # Key Resolution
//!
//! Produces the effective key for a run: either a user override (`--key "C major"`,
//! `--key Am`) or the result of key detection on the score.
//!
//! ## Override precedence
//! 1. Direct parse of the whole text by the engine (`"C"`, `"a"`, `"F#"`)
//! 2. Text ending in `major`/`minor` (any case): tonic + explicit mode
//! 3. Text ending in `m`: tonic + minor
//! 4. The whole text as a tonic with the default mode
//!
//! Override failures are reported to the user. Detection failures are not: they fall back
//! to C major.

use std::fmt;

use tracing::debug;

use crate::error::{AnalysisError, KeyParseError};
use crate::pitch::{Letter, PitchClass};
use crate::score::Score;
use crate::theory::HarmonyEngine;

/// Major or minor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => f.write_str("major"),
            Mode::Minor => f.write_str("minor"),
        }
    }
}

/// The key every Roman numeral is derived against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Key {
    pub tonic: PitchClass,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: PitchClass, mode: Mode) -> Self {
        Self { tonic, mode }
    }

    /// The fallback used whenever detection has nothing to say.
    pub fn c_major() -> Self {
        Self::new(PitchClass::new(Letter::C, 0), Mode::Major)
    }

    /// Build a key from a tonic name.
    ///
    /// With an explicit `mode` the tonic's letter case is ignored. Without one, an
    /// uppercase letter means major and a lowercase letter means minor.
    ///
    /// # Examples
    /// ```
    /// use chord_roman::key::{Key, Mode};
    ///
    /// assert_eq!(Key::from_tonic("C", None).unwrap().to_string(), "C major");
    /// assert_eq!(Key::from_tonic("a", None).unwrap().to_string(), "A minor");
    /// assert_eq!(Key::from_tonic("bb", Some(Mode::Major)).unwrap().to_string(), "Bb major");
    /// ```
    pub fn from_tonic(text: &str, mode: Option<Mode>) -> Result<Self, KeyParseError> {
        let trimmed = text.trim();
        let first = trimmed.chars().next().ok_or(KeyParseError::Empty)?;
        let tonic = PitchClass::parse(trimmed)
            .ok_or_else(|| KeyParseError::UnknownTonic(trimmed.to_string()))?;
        let mode = mode.unwrap_or(if first.is_lowercase() {
            Mode::Minor
        } else {
            Mode::Major
        });
        Ok(Self { tonic, mode })
    }

    /// Semitones of the seven scale degrees above the tonic.
    pub fn scale(&self) -> [u8; 7] {
        match self.mode {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}

/// Strip an ASCII suffix ignoring case, without slicing through a multi-byte character.
fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    let tail = text.get(split..)?;
    if tail.eq_ignore_ascii_case(suffix) {
        text.get(..split)
    } else {
        None
    }
}

/// Parse a `--key` override using the precedence described in the module docs.
pub fn parse_key_override(
    engine: &dyn HarmonyEngine,
    key_text: &str,
) -> Result<Key, AnalysisError> {
    let text = key_text.trim();
    if let Ok(key) = engine.parse_key_text(text) {
        return Ok(key);
    }

    let attempt = if let Some(tonic) = strip_suffix_ignore_case(text, "major") {
        engine.construct_key(tonic.trim(), Some(Mode::Major))
    } else if let Some(tonic) = strip_suffix_ignore_case(text, "minor") {
        engine.construct_key(tonic.trim(), Some(Mode::Minor))
    } else if let Some(tonic) = strip_suffix_ignore_case(text, "m") {
        engine.construct_key(tonic.trim(), Some(Mode::Minor))
    } else {
        engine.construct_key(text, None)
    };

    attempt.map_err(|e| AnalysisError::KeyParse {
        text: key_text.to_string(),
        message: e.to_string(),
    })
}

/// Return the override key if one was given, otherwise detect it from the score.
pub fn resolve_key(
    engine: &dyn HarmonyEngine,
    score: &Score,
    key_text: Option<&str>,
) -> Result<Key, AnalysisError> {
    match key_text {
        Some(text) => parse_key_override(engine, text),
        None => Ok(detect_or_default(engine, score)),
    }
}

/// Detect the key, substituting C major when detection fails.
pub fn detect_or_default(engine: &dyn HarmonyEngine, score: &Score) -> Key {
    match engine.detect_key(score) {
        Ok(key) => key,
        Err(e) => {
            debug!("Key detection failed ({}), using C major", e);
            Key::c_major()
        }
    }
}
