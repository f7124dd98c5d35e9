//! # Music Theory Capabilities
//!
//! The analysis pipeline never does music-theory inference itself. It asks a
//! [`HarmonyEngine`] to:
//! 1. **Detect the key** of a score
//! 2. **Construct a key** from a name ("C", "a", "F#") with an optional explicit mode
//! 3. **Reduce** the score to a time-ordered stream of rests, single notes and chords
//! 4. **Derive a Roman numeral** figure for one chord in a key
//!
//! Every capability takes explicit inputs and returns an explicit result, so tests can drive
//! the pipeline with a fake engine and fixed inputs instead of real scores.
//!
//! ## Sub-modules
//! - `key_detect` - Krumhansl-Kessler profile correlation over a pitch-class histogram
//! - `chordify` - Time-slice reduction of overlapping notes into simultaneous groups
//! - `figures` - Template chord matching and Roman numeral spelling
//!
//! ## Example
//! ```rust
//! use chord_roman::theory::{BuiltinEngine, CandidateGroup, HarmonyEngine};
//! use chord_roman::key::Key;
//!
//! let engine = BuiltinEngine::new();
//! let group = CandidateGroup::new(0.0, 1.0, &["B3", "D4", "F4", "G4"]);
//! assert_eq!(engine.derive_roman(&group, &Key::c_major()).unwrap(), "V65");
//! ```

mod chordify;
mod figures;
mod key_detect;

pub use chordify::chordify;
pub use figures::derive_figure;
pub use key_detect::{detect_key, pitch_class_histogram};

use crate::error::{KeyDetectionError, KeyParseError, SkipReason};
use crate::key::{Key, Mode};
use crate::score::Score;

/// A simultaneous set of pitches produced by the reduction.
///
/// Pitch names keep the order the reducer gave them.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateGroup {
    /// Onset in quarter notes
    pub offset: f64,
    /// Length in quarter notes (may be 0)
    pub duration: f64,
    pub pitch_names: Vec<String>,
}

impl CandidateGroup {
    pub fn new(offset: f64, duration: f64, pitch_names: &[&str]) -> Self {
        Self {
            offset,
            duration,
            pitch_names: pitch_names.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// One element of the reduced harmonic stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamElement {
    Rest { offset: f64, duration: f64 },
    Note { offset: f64, duration: f64, pitch: String },
    Chord(CandidateGroup),
}

impl StreamElement {
    pub fn offset(&self) -> f64 {
        match self {
            StreamElement::Rest { offset, .. } | StreamElement::Note { offset, .. } => *offset,
            StreamElement::Chord(group) => group.offset,
        }
    }
}

/// The music-theory capabilities the analysis depends on.
pub trait HarmonyEngine {
    /// Most likely key of the score. Failures are absorbed by the caller.
    fn detect_key(&self, score: &Score) -> Result<Key, KeyDetectionError>;

    /// Direct parse of a key name, the first thing tried for a `--key` override.
    fn parse_key_text(&self, text: &str) -> Result<Key, KeyParseError>;

    /// Build a key from a tonic name and an optional explicit mode.
    fn construct_key(&self, tonic: &str, mode: Option<Mode>) -> Result<Key, KeyParseError>;

    /// Reduce a score to a time-ordered stream of simultaneous-pitch groups.
    fn reduce(&self, score: &Score) -> Vec<StreamElement>;

    /// Detailed Roman numeral figure for a group, or why it cannot be analyzed.
    fn derive_roman(&self, group: &CandidateGroup, key: &Key) -> Result<String, SkipReason>;
}

/// The engine shipped with chord-roman.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEngine;

impl BuiltinEngine {
    pub fn new() -> Self {
        Self
    }
}

impl HarmonyEngine for BuiltinEngine {
    fn detect_key(&self, score: &Score) -> Result<Key, KeyDetectionError> {
        detect_key(score)
    }

    fn parse_key_text(&self, text: &str) -> Result<Key, KeyParseError> {
        Key::from_tonic(text, None)
    }

    fn construct_key(&self, tonic: &str, mode: Option<Mode>) -> Result<Key, KeyParseError> {
        Key::from_tonic(tonic, mode)
    }

    fn reduce(&self, score: &Score) -> Vec<StreamElement> {
        chordify(score)
    }

    fn derive_roman(&self, group: &CandidateGroup, key: &Key) -> Result<String, SkipReason> {
        derive_figure(&group.pitch_names, key)
    }
}
