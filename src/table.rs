//! Fixed-width terminal table of analyzed chords

use std::fmt::Write;

use crate::analysis::AnalyzedChord;
use crate::key::Key;

/// Width of the title line and the separator
pub const TABLE_WIDTH: usize = 100;

pub const NO_CHORDS_MESSAGE: &str = "No chords found with the current settings.";

/// Display-only options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOptions {
    pub show_notes: bool,
    /// Tempo used for the seconds column; hidden when `None` or not positive
    pub bpm: Option<f64>,
    /// Maximum number of rows printed
    pub limit: Option<usize>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            show_notes: true,
            bpm: None,
            limit: None,
        }
    }
}

/// One table row.
///
/// # Example
/// ```
/// use chord_roman::analysis::AnalyzedChord;
/// use chord_roman::table::format_row;
///
/// let chord = AnalyzedChord {
///     index: 3,
///     offset_quarter: 2.0,
///     roman: "V6532".to_string(),
///     roman_simple: "V65".to_string(),
///     duration_quarter: 1.0,
///     pitch_names: vec!["B3".to_string(), "D4".to_string()],
/// };
/// assert_eq!(
///     format_row(&chord, Some(120.0), true),
///     "   3      2.00q      1.00s       V65       V6532  B3,D4"
/// );
/// ```
pub fn format_row(chord: &AnalyzedChord, bpm: Option<f64>, show_notes: bool) -> String {
    let secs = match bpm {
        Some(bpm) if bpm > 0.0 => format!("{:>8.2}s", chord.offset_quarter / (bpm / 60.0)),
        _ => " ".repeat(8),
    };
    let mut row = format!(
        "{:>4}  {:>8.2}q  {}  {:>8}  {:>10}",
        chord.index, chord.offset_quarter, secs, chord.roman_simple, chord.roman
    );
    if show_notes {
        row.push_str("  ");
        row.push_str(&chord.pitch_names.join(","));
    }
    row
}

/// `File: <name>` on the left, `Key: <key>` on the right, at least one space apart.
pub fn title_line(file_name: &str, key: &Key) -> String {
    let left = format!("File: {}", file_name);
    let right = format!("Key: {}", key);
    let used = left.chars().count() + right.chars().count();
    let gap = TABLE_WIDTH.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

pub fn header_line(show_notes: bool) -> String {
    let mut header = format!(
        "{:>4}  {:>8}  {:>8}  {:>8}  {:>10}",
        "Index", "Offset(q)", "Secs", "Roman", "Figure"
    );
    if show_notes {
        header.push_str("  Notes");
    }
    header
}

/// The full table text, newline terminated.
pub fn render_table(
    file_name: &str,
    key: &Key,
    chords: &[AnalyzedChord],
    options: &TableOptions,
) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", title_line(file_name, key));
    let _ = writeln!(out, "{}", header_line(options.show_notes));
    let _ = writeln!(out, "{}", "-".repeat(TABLE_WIDTH));

    let limit = options.limit.unwrap_or(usize::MAX);
    for chord in chords.iter().take(limit) {
        let _ = writeln!(out, "{}", format_row(chord, options.bpm, options.show_notes));
    }
    if chords.is_empty() {
        let _ = writeln!(out, "{}", NO_CHORDS_MESSAGE);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Mode;
    use crate::pitch::{Letter, PitchClass};

    fn chord(index: usize, offset: f64, simple: &str, roman: &str) -> AnalyzedChord {
        AnalyzedChord {
            index,
            offset_quarter: offset,
            roman: roman.to_string(),
            roman_simple: simple.to_string(),
            duration_quarter: 1.0,
            pitch_names: vec!["C4".to_string(), "E4".to_string(), "G4".to_string()],
        }
    }

    #[test]
    fn test_row_without_tempo_or_notes() {
        let row = format_row(&chord(1, 0.0, "I", "I"), None, false);
        assert_eq!(row, "   1      0.00q                   I           I");
    }

    #[test]
    fn test_row_ignores_non_positive_tempo() {
        let with_zero = format_row(&chord(1, 4.0, "I", "I"), Some(0.0), false);
        let without = format_row(&chord(1, 4.0, "I", "I"), None, false);
        assert_eq!(with_zero, without);
    }

    #[test]
    fn test_row_with_tempo_and_notes() {
        let row = format_row(&chord(12, 6.5, "V7", "V7"), Some(90.0), true);
        assert_eq!(row, "  12      6.50q      4.33s        V7          V7  C4,E4,G4");
    }

    #[test]
    fn test_title_line_is_padded_to_width() {
        let key = Key::new(PitchClass::new(Letter::B, -1), Mode::Major);
        let line = title_line("song.mid", &key);
        assert_eq!(line.len(), TABLE_WIDTH);
        assert!(line.starts_with("File: song.mid "));
        assert!(line.ends_with("Key: Bb major"));
    }

    #[test]
    fn test_title_line_keeps_a_space() {
        let long = "x".repeat(120);
        let line = title_line(&long, &Key::c_major());
        assert!(line.contains(&format!("{} Key: C major", long)));
    }

    #[test]
    fn test_header() {
        assert_eq!(
            header_line(false),
            "Index  Offset(q)      Secs     Roman      Figure"
        );
        assert!(header_line(true).ends_with("Figure  Notes"));
    }

    #[test]
    fn test_limit_truncates_rows_only() {
        let chords: Vec<AnalyzedChord> = (1..=5)
            .map(|i| chord(i, i as f64, "I", "I"))
            .collect();
        let options = TableOptions {
            show_notes: false,
            bpm: None,
            limit: Some(2),
        };
        let text = render_table("a.mid", &Key::c_major(), &chords, &options);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("   1"));
        assert!(lines[4].starts_with("   2"));
    }

    #[test]
    fn test_empty_table_message() {
        let text = render_table("a.mid", &Key::c_major(), &[], &TableOptions::default());
        assert_eq!(text.lines().last(), Some(NO_CHORDS_MESSAGE));
        assert_eq!(text.lines().count(), 4);
    }
}
