//! Key detection
//!
//! Builds a duration-weighted pitch-class histogram of the score and correlates it against
//! the 24 rotations of the Krumhansl-Kessler major and minor profiles. The highest Pearson
//! correlation wins; ties go to the earlier candidate (C major first).
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use tracing::debug;

use crate::error::KeyDetectionError;
use crate::key::{Key, Mode};
use crate::pitch::{Letter, PitchClass};
use crate::score::Score;

// Krumhansl-Kessler key profiles (probe-tone ratings, tonic first).
const KK_MAJOR: [f64; 12] = [6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88];
const KK_MINOR: [f64; 12] = [6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17];

/// Conventional tonic spellings for major keys, indexed by semitone
const MAJOR_TONICS: [(Letter, i8); 12] = [
    (Letter::C, 0),
    (Letter::D, -1),
    (Letter::D, 0),
    (Letter::E, -1),
    (Letter::E, 0),
    (Letter::F, 0),
    (Letter::F, 1),
    (Letter::G, 0),
    (Letter::A, -1),
    (Letter::A, 0),
    (Letter::B, -1),
    (Letter::B, 0),
];

/// Conventional tonic spellings for minor keys, indexed by semitone
const MINOR_TONICS: [(Letter, i8); 12] = [
    (Letter::C, 0),
    (Letter::C, 1),
    (Letter::D, 0),
    (Letter::E, -1),
    (Letter::E, 0),
    (Letter::F, 0),
    (Letter::F, 1),
    (Letter::G, 0),
    (Letter::G, 1),
    (Letter::A, 0),
    (Letter::B, -1),
    (Letter::B, 0),
];

/// Weight given to notes without a positive duration
const ZERO_DURATION_WEIGHT: f64 = 0.25;

/// Total sounding time per pitch class.
pub fn pitch_class_histogram(score: &Score) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for note in &score.notes {
        let weight = if note.duration > 0.0 {
            note.duration
        } else {
            ZERO_DURATION_WEIGHT
        };
        histogram[note.pitch.class.semitone() as usize] += weight;
    }
    histogram
}

/// Pearson correlation between a histogram rotated to `shift` and a profile.
fn pearson_correlate(histogram: &[f64; 12], profile: &[f64; 12], shift: usize) -> Option<f64> {
    let mut x = [0.0; 12];
    for (i, value) in x.iter_mut().enumerate() {
        *value = histogram[(i + shift) % 12];
    }

    let n = 12.0;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = profile.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..12 {
        let dx = x[i] - mean_x;
        let dy = profile[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom > 1e-10 {
        Some(cov / denom)
    } else {
        None
    }
}

/// Detect the most likely key of a score.
///
/// # Errors
/// - [`KeyDetectionError::NoNotes`] for a score without notes
/// - [`KeyDetectionError::Ambiguous`] when every pitch class is equally present
pub fn detect_key(score: &Score) -> Result<Key, KeyDetectionError> {
    if score.is_empty() {
        return Err(KeyDetectionError::NoNotes);
    }
    let histogram = pitch_class_histogram(score);

    let mut best: Option<(f64, usize, Mode)> = None;
    for shift in 0..12 {
        for (profile, mode) in [(&KK_MAJOR, Mode::Major), (&KK_MINOR, Mode::Minor)] {
            let Some(r) = pearson_correlate(&histogram, profile, shift) else {
                continue;
            };
            if best.map_or(true, |(b, _, _)| r > b) {
                best = Some((r, shift, mode));
            }
        }
    }

    let (correlation, shift, mode) = best.ok_or(KeyDetectionError::Ambiguous)?;
    let (letter, alter) = match mode {
        Mode::Major => MAJOR_TONICS[shift],
        Mode::Minor => MINOR_TONICS[shift],
    };
    let key = Key::new(PitchClass::new(letter, alter), mode);
    debug!("Detected key {} (r = {:.3})", key, correlation);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Pitch;
    use crate::score::ScoreNote;

    fn score_of(names: &[(&str, f64)]) -> Score {
        let mut offset = 0.0;
        let notes = names
            .iter()
            .map(|(name, duration)| {
                let note = ScoreNote {
                    pitch: Pitch::parse(name).unwrap(),
                    offset,
                    duration: *duration,
                    part: 0,
                };
                offset += duration;
                note
            })
            .collect();
        Score {
            notes,
            ..Default::default()
        }
    }

    #[test]
    fn test_c_major_scale() {
        let score = score_of(&[
            ("C4", 2.0),
            ("D4", 1.0),
            ("E4", 1.0),
            ("F4", 1.0),
            ("G4", 2.0),
            ("A4", 1.0),
            ("B4", 1.0),
            ("C5", 2.0),
        ]);
        assert_eq!(detect_key(&score).unwrap().to_string(), "C major");
    }

    #[test]
    fn test_a_minor_triad_emphasis() {
        let score = score_of(&[
            ("A3", 3.0),
            ("C4", 2.0),
            ("E4", 2.0),
            ("A4", 3.0),
            ("B3", 0.5),
            ("D4", 0.5),
            ("G#3", 1.0),
        ]);
        assert_eq!(detect_key(&score).unwrap().to_string(), "A minor");
    }

    #[test]
    fn test_flat_key_spelling() {
        let score = score_of(&[
            ("B-3", 3.0),
            ("D4", 2.0),
            ("F4", 2.0),
            ("E-4", 1.0),
            ("C4", 1.0),
            ("A3", 0.5),
            ("G3", 1.0),
            ("B-4", 3.0),
        ]);
        assert_eq!(detect_key(&score).unwrap().to_string(), "Bb major");
    }

    #[test]
    fn test_empty_score_fails() {
        assert_eq!(detect_key(&Score::default()), Err(KeyDetectionError::NoNotes));
    }

    #[test]
    fn test_chromatic_aggregate_is_ambiguous() {
        let names: Vec<String> = (60..72).map(|m| Pitch::from_midi(m).to_string()).collect();
        let pairs: Vec<(&str, f64)> = names.iter().map(|n| (n.as_str(), 1.0)).collect();
        assert_eq!(
            detect_key(&score_of(&pairs)),
            Err(KeyDetectionError::Ambiguous)
        );
    }
}
