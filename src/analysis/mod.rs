//! # Analysis Module
//!
//! Turn a score into an ordered list of Roman numeral chord records.
//!
//! ## Pipeline
//! 1. **Key** - the `--key` override if given, otherwise detection (falling back to C major)
//! 2. **Reduction** - the engine flattens the score into rests, single notes and chords
//! 3. **Assembly** - every chord with enough distinct pitches gets a figure, a snapped
//!    offset, a positive duration, an optional dedupe check, a simplified figure and an index
//!
//! ## Sub-modules
//! - `types` - AnalyzedChord, AnalysisOptions, Analysis
//! - `filter` - Which stream elements count as chords
//! - `quantize` - Offset snapping
//! - `simplify` - Detailed figure to root + inversion
//! - `dedupe` - Consecutive-duplicate suppression
//! - `assembler` - Per-element pipeline and record numbering
//!
//! ## Entry Points
//! - [`analyze_file()`] - Load a MIDI or MusicXML file and analyze it
//! - [`analyze_score()`] - Analyze an already loaded score
//!
//! ## Example
//! ```rust
//! use chord_roman::analysis::{analyze_score, AnalysisOptions};
//! use chord_roman::pitch::Pitch;
//! use chord_roman::score::{Score, ScoreNote};
//! use chord_roman::theory::BuiltinEngine;
//!
//! let mut score = Score::default();
//! for (offset, names) in [(0.0, ["C4", "E4", "G4"]), (1.0, ["G3", "B3", "D4"])] {
//!     for name in names {
//!         score.notes.push(ScoreNote::new(Pitch::parse(name).unwrap(), offset, 1.0, 0));
//!     }
//! }
//!
//! let analysis = analyze_score(&BuiltinEngine::new(), &score, Some("C"), &AnalysisOptions::default()).unwrap();
//! let figures: Vec<&str> = analysis.chords.iter().map(|c| c.roman.as_str()).collect();
//! assert_eq!(figures, ["I", "V"]);
//! ```

mod assembler;
mod dedupe;
mod filter;
mod quantize;
mod simplify;
mod types;


pub use assembler::{assemble, effective_duration, AnalysisAssembler};
pub use dedupe::Deduplicator;
pub use filter::{distinct_pitches, harmonic_chord, is_harmonic_chord};
pub use quantize::quantize;
pub use simplify::simplify_roman_figure;
pub use types::{Analysis, AnalysisOptions, AnalyzedChord, FALLBACK_DURATION};

use std::path::Path;

use tracing::info;

use crate::error::AnalysisError;
use crate::key::{detect_or_default, parse_key_override, resolve_key, Key};
use crate::score::{load_score, Score};
use crate::theory::HarmonyEngine;

/// Analyze a loaded score, resolving the key from `key_text` or by detection.
pub fn analyze_score(
    engine: &dyn HarmonyEngine,
    score: &Score,
    key_text: Option<&str>,
    options: &AnalysisOptions,
) -> Result<Analysis, AnalysisError> {
    let key = resolve_key(engine, score, key_text)?;
    Ok(analyze_with_key(engine, score, key, options))
}

/// Analyze a score against a key that is already settled.
pub fn analyze_with_key(
    engine: &dyn HarmonyEngine,
    score: &Score,
    key: Key,
    options: &AnalysisOptions,
) -> Analysis {
    let elements = engine.reduce(score);
    let chords = assemble(engine, key, &elements, *options);
    info!(
        "Analyzed {} chords from {} stream elements in {}",
        chords.len(),
        elements.len(),
        key
    );
    Analysis { key, chords }
}

/// Load and analyze a file.
///
/// A missing file is reported before the key override is looked at, and a bad override
/// is reported before the file is parsed.
pub fn analyze_file(
    path: &Path,
    engine: &dyn HarmonyEngine,
    key_text: Option<&str>,
    options: &AnalysisOptions,
) -> Result<Analysis, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::MissingInput(path.to_path_buf()));
    }
    let key_override = key_text
        .map(|text| parse_key_override(engine, text))
        .transpose()?;

    let score = load_score(path)?;
    let key = match key_override {
        Some(key) => key,
        None => detect_or_default(engine, &score),
    };
    Ok(analyze_with_key(engine, &score, key, options))
}
