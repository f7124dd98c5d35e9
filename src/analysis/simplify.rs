//! Roman numeral simplification
//!
//! Reduces a detailed figure to its root and a single inversion code, keeping the
//! numeral's case, accidentals and quality marks.

/// Inversion codes in priority order. Seventh-chord codes come first so that "65" is
/// never read as a first-inversion triad.
const SUFFIXES: [&str; 6] = ["65", "43", "42", "7", "64", "6"];

/// Simplify a Roman numeral figure (`V6532` -> `V65`, `iv64` -> `iv64`, `V7` -> `V7`).
///
/// Everything before the first digit is the root; the first suffix found anywhere in the
/// remaining figures is appended.
///
/// # Examples
/// ```
/// use chord_roman::analysis::simplify_roman_figure;
///
/// assert_eq!(simplify_roman_figure("V6532"), "V65");
/// assert_eq!(simplify_roman_figure("ii"), "ii");
/// assert_eq!(simplify_roman_figure(""), "");
/// ```
pub fn simplify_roman_figure(figure: &str) -> String {
    let split = figure
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(figure.len());
    let (root, trailing) = figure.split_at(split);

    let suffix = SUFFIXES
        .iter()
        .find(|s| trailing.contains(*s))
        .copied()
        .unwrap_or("");
    format!("{}{}", root, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples() {
        assert_eq!(simplify_roman_figure("V6532"), "V65");
        assert_eq!(simplify_roman_figure("iv64"), "iv64");
        assert_eq!(simplify_roman_figure("ii"), "ii");
        assert_eq!(simplify_roman_figure("V7"), "V7");
        assert_eq!(simplify_roman_figure("I"), "I");
    }

    #[test]
    fn test_seventh_codes_win() {
        assert_eq!(simplify_roman_figure("V7653"), "V65");
        assert_eq!(simplify_roman_figure("viio643"), "viio43");
        assert_eq!(simplify_roman_figure("V642"), "V42");
        assert_eq!(simplify_roman_figure("V7532"), "V7");
    }

    #[test]
    fn test_triad_codes() {
        assert_eq!(simplify_roman_figure("I63"), "I6");
        assert_eq!(simplify_roman_figure("bVI64"), "bVI64");
        assert_eq!(simplify_roman_figure("V53"), "V");
        assert_eq!(simplify_roman_figure("I+6"), "I+6");
    }

    #[test]
    fn test_secondary_figures_keep_root() {
        assert_eq!(simplify_roman_figure("V/V"), "V/V");
        assert_eq!(simplify_roman_figure("viio7/V"), "viio7");
    }

    #[test]
    fn test_pure_and_total() {
        for figure in ["", "I", "V6532", "#ivo7", "ø", "9"] {
            assert_eq!(simplify_roman_figure(figure), simplify_roman_figure(figure));
        }
        assert_eq!(simplify_roman_figure(""), "");
        assert_eq!(simplify_roman_figure("9"), "");
    }

    #[test]
    fn test_figures_containing_65_end_in_65() {
        for figure in ["V65", "V6532", "ii6543", "vii7652"] {
            assert!(simplify_roman_figure(figure).ends_with("65"), "{}", figure);
        }
    }
}
