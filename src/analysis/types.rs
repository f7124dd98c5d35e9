//! Analysis type definitions

use crate::key::Key;

/// Duration given to a chord whose source duration is not positive and no grid is set
pub const FALLBACK_DURATION: f64 = 0.25;

/// One analyzed chord occurrence.
///
/// # Fields
/// - `index`: 1-based position in the output, contiguous across the whole analysis
/// - `offset_quarter`: onset snapped to the quantization grid
/// - `roman`: detailed figure exactly as derived (e.g. `V6532`)
/// - `roman_simple`: root and inversion only (e.g. `V65`), derived from `roman`
/// - `duration_quarter`: always positive
/// - `pitch_names`: pitches as given by the reduction (e.g. `["G3", "B3", "D4"]`)
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedChord {
    pub index: usize,
    pub offset_quarter: f64,
    pub roman: String,
    pub roman_simple: String,
    pub duration_quarter: f64,
    pub pitch_names: Vec<String>,
}

/// Knobs for one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    /// Quantization grid in quarter notes; 0 or less disables quantization
    pub grid: f64,
    /// Collapse consecutive chords with the same detailed figure
    pub dedupe: bool,
    /// Minimum number of distinct pitches for a group to count as a chord
    pub min_notes: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            grid: 0.25,
            dedupe: false,
            min_notes: 3,
        }
    }
}

/// Result of analyzing one score.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Key every figure was derived against
    pub key: Key,
    pub chords: Vec<AnalyzedChord>,
}

impl Analysis {
    /// True when nothing survived filtering ("no chords found").
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}
