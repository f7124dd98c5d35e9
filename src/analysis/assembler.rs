//! Chord record assembly
//!
//! Walks the reduced stream in order and turns every qualifying chord into an
//! [`AnalyzedChord`]. Per element the steps are:
//! filter, derive, quantize, duration fallback, dedupe, simplify, index.

use tracing::debug;

use crate::key::Key;
use crate::theory::{HarmonyEngine, StreamElement};

use super::dedupe::Deduplicator;
use super::filter::harmonic_chord;
use super::quantize::quantize;
use super::simplify::simplify_roman_figure;
use super::types::{AnalysisOptions, AnalyzedChord, FALLBACK_DURATION};

/// Replace a non-positive duration: the grid when quantizing, otherwise a sixteenth.
///
/// # Examples
/// ```
/// use chord_roman::analysis::effective_duration;
///
/// assert_eq!(effective_duration(1.5, 0.25), 1.5);
/// assert_eq!(effective_duration(0.0, 0.5), 0.5);
/// assert_eq!(effective_duration(0.0, 0.0), 0.25);
/// ```
pub fn effective_duration(duration: f64, grid: f64) -> f64 {
    if duration > 0.0 {
        duration
    } else if grid > 0.0 {
        grid
    } else {
        FALLBACK_DURATION
    }
}

/// Accumulates chord records for one analysis pass.
pub struct AnalysisAssembler<'a> {
    engine: &'a dyn HarmonyEngine,
    key: Key,
    options: AnalysisOptions,
    dedupe: Deduplicator,
    chords: Vec<AnalyzedChord>,
}

impl<'a> AnalysisAssembler<'a> {
    pub fn new(engine: &'a dyn HarmonyEngine, key: Key, options: AnalysisOptions) -> Self {
        Self {
            engine,
            key,
            options,
            dedupe: Deduplicator::new(options.dedupe),
            chords: Vec::new(),
        }
    }

    /// Process one stream element. Returns the new record if one was emitted.
    pub fn push(&mut self, element: &StreamElement) -> Option<&AnalyzedChord> {
        let group = harmonic_chord(element, self.options.min_notes)?;

        let roman = match self.engine.derive_roman(group, &self.key) {
            Ok(roman) => roman,
            Err(reason) => {
                debug!("Skipping chord at {}: {}", group.offset, reason);
                return None;
            }
        };

        let offset_quarter = quantize(group.offset, self.options.grid);
        let duration_quarter = effective_duration(group.duration, self.options.grid);

        if !self.dedupe.admit(&roman) {
            debug!("Dropping repeated {} at {}", roman, offset_quarter);
            return None;
        }

        let roman_simple = simplify_roman_figure(&roman);
        self.chords.push(AnalyzedChord {
            index: self.chords.len() + 1,
            offset_quarter,
            roman,
            roman_simple,
            duration_quarter,
            pitch_names: group.pitch_names.clone(),
        });
        self.chords.last()
    }

    /// Records emitted so far
    pub fn chords(&self) -> &[AnalyzedChord] {
        &self.chords
    }

    pub fn finish(self) -> Vec<AnalyzedChord> {
        self.chords
    }
}

/// Run the assembler over a whole stream.
pub fn assemble(
    engine: &dyn HarmonyEngine,
    key: Key,
    elements: &[StreamElement],
    options: AnalysisOptions,
) -> Vec<AnalyzedChord> {
    let mut assembler = AnalysisAssembler::new(engine, key, options);
    for element in elements {
        assembler.push(element);
    }
    assembler.finish()
}
