//! # Chord Snippet Export
//!
//! Writes every analyzed chord as its own tiny file: one simultaneous group of the chord's
//! pitches at a neutral tempo, so each chord can be auditioned or dropped into a DAW.
//!
//! File names are `<index:03>_<simplified figure>.<ext>` with `/` replaced by `-`
//! (`007_V-V.mid`). One bad snippet never stops the rest: failures are logged, collected
//! in the [`ExportReport`], and the loop moves on.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::analysis::AnalyzedChord;
use crate::error::ExportError;
use crate::midi::{write_notes, MidiNote};
use crate::pitch::Pitch;

/// Tempo written into every snippet
pub const SNIPPET_TEMPO_BPM: f64 = 120.0;

/// Shortest snippet length in quarter notes
pub const MIN_SNIPPET_QUARTERS: f64 = 0.25;

/// Something that can render one chord to a file.
pub trait SnippetWriter {
    /// File extension without the dot
    fn extension(&self) -> &str;

    fn write_snippet(
        &self,
        pitch_names: &[String],
        duration_quarter: f64,
        tempo_bpm: f64,
        path: &Path,
    ) -> Result<(), ExportError>;
}

/// Writes snippets as format 0 Standard MIDI Files.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidiSnippetWriter;

impl SnippetWriter for MidiSnippetWriter {
    fn extension(&self) -> &str {
        "mid"
    }

    fn write_snippet(
        &self,
        pitch_names: &[String],
        duration_quarter: f64,
        tempo_bpm: f64,
        path: &Path,
    ) -> Result<(), ExportError> {
        if pitch_names.is_empty() {
            return Err(ExportError::Empty);
        }
        let notes = pitch_names
            .iter()
            .map(|name| {
                Pitch::parse(name)
                    .and_then(|p| p.midi())
                    .map(|key| MidiNote {
                        key,
                        offset: 0.0,
                        duration: duration_quarter,
                    })
                    .ok_or_else(|| ExportError::BadPitch(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = BufWriter::new(File::create(path)?);
        write_notes(&notes, tempo_bpm, &mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// Snippet file name for a record (`007_V-V.mid`).
pub fn snippet_file_name(chord: &AnalyzedChord, extension: &str) -> String {
    format!(
        "{:03}_{}.{}",
        chord.index,
        chord.roman_simple.replace('/', "-"),
        extension
    )
}

/// Default snippet directory: `<input dir>/<input stem>_chords`.
pub fn default_export_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "score".to_string());
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{}_chords", stem))
}

/// What an export run produced.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, ExportError)>,
}

impl ExportReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write one snippet per record into `dir`, creating it if needed.
pub fn export_snippets(
    dir: &Path,
    chords: &[AnalyzedChord],
    writer: &dyn SnippetWriter,
) -> ExportReport {
    let mut report = ExportReport::default();

    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Could not create snippet directory {}: {}", dir.display(), e);
        report.failures.push((dir.to_path_buf(), e.into()));
        return report;
    }

    for chord in chords {
        let path = dir.join(snippet_file_name(chord, writer.extension()));
        let duration = chord.duration_quarter.max(MIN_SNIPPET_QUARTERS);
        match writer.write_snippet(&chord.pitch_names, duration, SNIPPET_TEMPO_BPM, &path) {
            Ok(()) => report.written.push(path),
            Err(e) => {
                warn!("Failed to export {}: {}", path.display(), e);
                report.failures.push((path, e));
            }
        }
    }

    info!(
        "Exported {} of {} snippets to {}",
        report.written.len(),
        chords.len(),
        dir.display()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn record(index: usize, simple: &str, duration: f64, names: &[&str]) -> AnalyzedChord {
        AnalyzedChord {
            index,
            offset_quarter: 0.0,
            roman: simple.to_string(),
            roman_simple: simple.to_string(),
            duration_quarter: duration,
            pitch_names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Fails on the record whose first pitch is "X", remembers every call.
    #[derive(Default)]
    struct RecordingWriter {
        calls: RefCell<Vec<(String, f64, f64)>>,
    }

    impl SnippetWriter for RecordingWriter {
        fn extension(&self) -> &str {
            "txt"
        }

        fn write_snippet(
            &self,
            pitch_names: &[String],
            duration_quarter: f64,
            tempo_bpm: f64,
            path: &Path,
        ) -> Result<(), ExportError> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.calls.borrow_mut().push((name, duration_quarter, tempo_bpm));
            if pitch_names.first().map(String::as_str) == Some("X") {
                return Err(ExportError::BadPitch("X".to_string()));
            }
            fs::write(path, pitch_names.join(","))?;
            Ok(())
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(snippet_file_name(&record(7, "V/V", 1.0, &[]), "mid"), "007_V-V.mid");
        assert_eq!(snippet_file_name(&record(1, "I", 1.0, &[]), "mid"), "001_I.mid");
        assert_eq!(snippet_file_name(&record(1234, "ii65", 1.0, &[]), "mid"), "1234_ii65.mid");
    }

    #[test]
    fn test_default_export_dir() {
        assert_eq!(
            default_export_dir(Path::new("/music/song.mid")),
            PathBuf::from("/music/song_chords")
        );
        assert_eq!(default_export_dir(Path::new("song.mid")), PathBuf::from("song_chords"));
    }

    #[test]
    fn test_failure_does_not_stop_export() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("snippets");
        let chords = vec![
            record(1, "I", 1.0, &["C4", "E4", "G4"]),
            record(2, "IV", 1.0, &["X", "A4"]),
            record(3, "V", 1.0, &["G3", "B3", "D4"]),
        ];
        let writer = RecordingWriter::default();

        let report = export_snippets(&out, &chords, &writer);

        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].0, out.join("002_IV.txt"));
        assert!(out.join("001_I.txt").exists());
        assert!(out.join("003_V.txt").exists());
        assert_eq!(writer.calls.borrow().len(), 3);
    }

    #[test]
    fn test_duration_floor_and_tempo() {
        let dir = tempfile::tempdir().unwrap();
        let chords = vec![
            record(1, "I", 0.1, &["C4", "E4", "G4"]),
            record(2, "V", 2.0, &["G3", "B3", "D4"]),
        ];
        let writer = RecordingWriter::default();
        export_snippets(dir.path(), &chords, &writer);

        let calls = writer.calls.borrow();
        assert_eq!(calls[0], ("001_I.txt".to_string(), 0.25, 120.0));
        assert_eq!(calls[1], ("002_V.txt".to_string(), 2.0, 120.0));
    }

    #[test]
    fn test_uncreatable_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let chords = vec![record(1, "I", 1.0, &["C4", "E4", "G4"])];
        let report = export_snippets(&blocker.join("sub"), &chords, &RecordingWriter::default());
        assert!(report.written.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_midi_snippet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("001_V7.mid");
        let names: Vec<String> = ["G3", "B3", "D4", "F4"].iter().map(|s| s.to_string()).collect();

        MidiSnippetWriter.write_snippet(&names, 2.0, 120.0, &path).unwrap();

        let score = crate::midi::read_midi(&fs::read(&path).unwrap()).unwrap();
        let written: Vec<String> = score.notes.iter().map(|n| n.pitch.to_string()).collect();
        assert_eq!(written, names);
        assert!(score.notes.iter().all(|n| n.offset == 0.0 && n.duration == 2.0));
        assert_eq!(score.tempo, Some(120.0));
    }

    #[test]
    fn test_midi_snippet_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.mid");

        let err = MidiSnippetWriter
            .write_snippet(&["Q4".to_string()], 1.0, 120.0, &path)
            .unwrap_err();
        assert!(matches!(err, ExportError::BadPitch(_)));
        assert!(matches!(
            MidiSnippetWriter.write_snippet(&[], 1.0, 120.0, &path),
            Err(ExportError::Empty)
        ));
    }
}
