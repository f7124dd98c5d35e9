//! Roman numeral derivation
//!
//! Finds the chord root by matching the pitch-class set against triad and seventh-chord
//! templates on every pitch in the chord, then spells the root as a scale degree of the key.
//!
//! ## Template ranking
//! 1. Most template tones present
//! 2. Fewest tones outside the template
//! 3. Fewest template tones missing
//! 4. Root in the bass
//! 5. Template order (major before minor before ...)
//!
//! ## Figures
//! | Bass          | Triad | Seventh |
//! |---------------|-------|---------|
//! | Root          |       | 7       |
//! | Third         | 6     | 65      |
//! | Fifth         | 64    | 43      |
//! | Seventh       |       | 42      |
//!
//! A chord with tones outside its template gets the full figured bass instead, e.g. `V7532`.
//!
//! ## Scale degrees
//! The degree comes from the letter distance between tonic and root, so spelling matters
//! (`F#` in C major is `#IV`, `Gb` is `bV`). In minor keys the raised sixth and seventh
//! degrees are treated as diatonic.

use crate::error::SkipReason;
use crate::key::{Key, Mode};
use crate::pitch::Pitch;

const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Quality {
    Major,
    Minor,
    Diminished,
    Augmented,
    HalfDiminished,
}

impl Quality {
    fn is_upper(self) -> bool {
        matches!(self, Quality::Major | Quality::Augmented)
    }

    fn mark(self) -> &'static str {
        match self {
            Quality::Major | Quality::Minor => "",
            Quality::Diminished => "o",
            Quality::Augmented => "+",
            Quality::HalfDiminished => "ø",
        }
    }
}

/// A chord shape as semitones above the root: third, fifth, and optional seventh.
struct Template {
    third: u8,
    fifth: u8,
    seventh: Option<u8>,
    quality: Quality,
}

impl Template {
    const fn triad(third: u8, fifth: u8, quality: Quality) -> Self {
        Self { third, fifth, seventh: None, quality }
    }

    const fn seventh(third: u8, fifth: u8, seventh: u8, quality: Quality) -> Self {
        Self { third, fifth, seventh: Some(seventh), quality }
    }

    fn intervals(&self) -> impl Iterator<Item = u8> + '_ {
        [0, self.third, self.fifth].into_iter().chain(self.seventh)
    }
}

static TEMPLATES: [Template; 9] = [
    Template::triad(4, 7, Quality::Major),
    Template::triad(3, 7, Quality::Minor),
    Template::triad(3, 6, Quality::Diminished),
    Template::triad(4, 8, Quality::Augmented),
    Template::seventh(4, 7, 10, Quality::Major),
    Template::seventh(4, 7, 11, Quality::Major),
    Template::seventh(3, 7, 10, Quality::Minor),
    Template::seventh(3, 6, 10, Quality::HalfDiminished),
    Template::seventh(3, 6, 9, Quality::Diminished),
];

/// A template placed on one of the chord's pitches
struct Candidate {
    root: Pitch,
    template: &'static Template,
    matched: usize,
    extra: usize,
    missing: usize,
    root_in_bass: bool,
}

impl Candidate {
    /// Higher is better; ties keep the earlier candidate.
    fn rank(&self) -> (usize, isize, isize, bool) {
        (
            self.matched,
            -(self.extra as isize),
            -(self.missing as isize),
            self.root_in_bass,
        )
    }
}

/// Semitone distance of `pitch` above `root`, within an octave.
fn interval(root: &Pitch, pitch: &Pitch) -> u8 {
    (pitch.class.semitone() as i32 - root.class.semitone() as i32).rem_euclid(12) as u8
}

fn best_candidate(pitches: &[Pitch], bass: &Pitch) -> Option<Candidate> {
    let mut classes: Vec<u8> = pitches.iter().map(|p| p.class.semitone()).collect();
    classes.sort_unstable();
    classes.dedup();

    let mut best: Option<Candidate> = None;
    let mut tried: Vec<u8> = Vec::new();
    for root in pitches {
        let root_class = root.class.semitone();
        if tried.contains(&root_class) {
            continue;
        }
        tried.push(root_class);

        for template in TEMPLATES.iter() {
            let chord_tones: Vec<u8> = template
                .intervals()
                .map(|i| (root_class + i) % 12)
                .collect();
            let matched = chord_tones.iter().filter(|t| classes.contains(t)).count();
            let candidate = Candidate {
                root: *root,
                template,
                matched,
                extra: classes.len() - matched,
                missing: chord_tones.len() - matched,
                root_in_bass: bass.class.semitone() == root_class,
            };
            if best.as_ref().map_or(true, |b| candidate.rank() > b.rank()) {
                best = Some(candidate);
            }
        }
    }
    best
}

/// Numeral with accidental prefix and case for the root's degree in the key.
fn numeral(key: &Key, root: &Pitch, quality: Quality) -> String {
    let degree = (root.class.letter.step() - key.tonic.letter.step()).rem_euclid(7) as usize;
    let semitones = (root.class.semitone() as i32 - key.tonic.semitone() as i32).rem_euclid(12);
    let mut offset = semitones - key.scale()[degree] as i32;
    if offset > 6 {
        offset -= 12;
    } else if offset < -6 {
        offset += 12;
    }
    // Raised sixth and seventh in minor are part of the key
    if key.mode == Mode::Minor && (degree == 5 || degree == 6) && offset == 1 {
        offset = 0;
    }

    let prefix = (if offset > 0 { "#" } else { "b" }).repeat(offset.unsigned_abs() as usize);
    let numeral = if quality.is_upper() {
        NUMERALS[degree].to_string()
    } else {
        NUMERALS[degree].to_lowercase()
    };
    format!("{}{}{}", prefix, numeral, quality.mark())
}

/// Figured bass digits for every pitch above the bass, largest first (e.g. "7532").
fn figured_bass(pitches: &[Pitch], bass: &Pitch) -> String {
    let mut digits: Vec<i32> = pitches
        .iter()
        .filter(|p| p.class != bass.class)
        .map(|p| (p.diatonic_number() - bass.diatonic_number()).rem_euclid(7) + 1)
        .filter(|d| *d != 1)
        .collect();
    digits.sort_unstable_by(|a, b| b.cmp(a));
    digits.dedup();
    digits.iter().map(|d| d.to_string()).collect()
}

/// Derive the detailed Roman numeral figure of a chord in a key.
///
/// # Examples
/// ```
/// use chord_roman::key::Key;
/// use chord_roman::theory::derive_figure;
///
/// let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
/// let c = Key::c_major();
/// assert_eq!(derive_figure(&names(&["C4", "E4", "G4"]), &c).unwrap(), "I");
/// assert_eq!(derive_figure(&names(&["E3", "G3", "C4"]), &c).unwrap(), "I6");
/// assert_eq!(derive_figure(&names(&["G3", "B3", "D4", "F4"]), &c).unwrap(), "V7");
/// assert_eq!(derive_figure(&names(&["D3", "F3", "A3"]), &c).unwrap(), "ii");
/// ```
pub fn derive_figure(pitch_names: &[String], key: &Key) -> Result<String, SkipReason> {
    let pitches = pitch_names
        .iter()
        .map(|name| Pitch::parse(name).ok_or_else(|| SkipReason::BadPitch(name.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let bass = pitches
        .iter()
        .min_by_key(|p| p.midi())
        .copied()
        .ok_or(SkipReason::NoRoot)?;

    let candidate = best_candidate(&pitches, &bass).ok_or(SkipReason::NoRoot)?;
    if candidate.matched < 2 {
        return Err(SkipReason::NoRoot);
    }

    let template = candidate.template;
    let numeral = numeral(key, &candidate.root, template.quality);

    if candidate.extra > 0 {
        return Ok(format!("{}{}", numeral, figured_bass(&pitches, &bass)));
    }

    let bass_interval = interval(&candidate.root, &bass);
    let figure = match (template.seventh, bass_interval) {
        (None, 0) => "",
        (None, i) if i == template.third => "6",
        (None, _) => "64",
        (Some(_), 0) => "7",
        (Some(_), i) if i == template.third => "65",
        (Some(_), i) if i == template.fifth => "43",
        (Some(_), _) => "42",
    };
    Ok(format!("{}{}", numeral, figure))
}
