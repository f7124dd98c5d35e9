//! # Score Model
//!
//! A flat, time-ordered view of the sounding notes in a performance file.
//!
//! Offsets and durations are in quarter-note units (1.0 = one quarter note), counted from
//! the start of the score. Parts and voices are flattened; `part` only records where a note
//! came from.
//!
//! ## Loading
//! [`load_score()`] picks a reader from the file extension:
//! - `.mid`, `.midi` - Standard MIDI File (see `midi`)
//! - `.musicxml`, `.xml` - MusicXML partwise (see `musicxml`)

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::AnalysisError;
use crate::pitch::Pitch;

/// A single sounding note.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreNote {
    pub pitch: Pitch,
    pub offset: f64,
    pub duration: f64,
    pub part: usize,
}

impl ScoreNote {
    pub fn new(pitch: Pitch, offset: f64, duration: f64, part: usize) -> Self {
        Self {
            pitch,
            offset,
            duration,
            part,
        }
    }

    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub title: Option<String>,
    /// Tempo in BPM of the first tempo marking, if the file has one
    pub tempo: Option<f64>,
    pub notes: Vec<ScoreNote>,
}

impl Score {
    /// Sort notes by onset, then by pitch, so every consumer sees time order.
    pub fn sort(&mut self) {
        self.notes.sort_by(|a, b| {
            a.offset
                .total_cmp(&b.offset)
                .then_with(|| a.pitch.midi().cmp(&b.pitch.midi()))
        });
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total length of the score in quarter notes.
    pub fn length(&self) -> f64 {
        self.notes.iter().map(ScoreNote::end).fold(0.0, f64::max)
    }
}

/// Score file formats chord-roman can read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreFormat {
    Midi,
    MusicXml,
}

impl ScoreFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mid" | "midi" => Some(ScoreFormat::Midi),
            "musicxml" | "xml" => Some(ScoreFormat::MusicXml),
            _ => None,
        }
    }
}

/// Read a score file from disk.
///
/// # Errors
/// - [`AnalysisError::MissingInput`] if the file does not exist
/// - [`AnalysisError::UnsupportedFormat`] for unknown extensions
/// - [`AnalysisError::ScoreParse`] if the contents cannot be read as a score
pub fn load_score(path: &Path) -> Result<Score, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::MissingInput(path.to_path_buf()));
    }
    let format = ScoreFormat::from_path(path)
        .ok_or_else(|| AnalysisError::UnsupportedFormat(path.display().to_string()))?;

    let parse_error = |message: String| AnalysisError::ScoreParse {
        path: path.to_path_buf(),
        message,
    };

    let score = match format {
        ScoreFormat::Midi => {
            let bytes = fs::read(path)?;
            crate::midi::read_midi(&bytes).map_err(parse_error)?
        }
        ScoreFormat::MusicXml => {
            let text = fs::read_to_string(path)?;
            crate::musicxml::read_musicxml(&text).map_err(parse_error)?
        }
    };

    info!(
        "Loaded {} notes ({:.2} quarters) from {}",
        score.notes.len(),
        score.length(),
        path.display()
    );
    Ok(score)
}
