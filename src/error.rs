//! # Error Types
//!
//! This module defines the error types for chord-roman.
//!
//! Errors fall into two groups. Fatal errors ([`AnalysisError`]) stop a run before any
//! table is printed. Local errors ([`KeyDetectionError`], [`SkipReason`], [`ExportError`])
//! affect a single step or a single chord and are absorbed by the pipeline.
//!
//! ## Error Types
//! - `AnalysisError` - Missing input, bad `--key` text, bad config, unreadable score
//! - `KeyParseError` - A key name that could not be constructed
//! - `KeyDetectionError` - Key detection had nothing to work with (falls back to C major)
//! - `SkipReason` - A chord group that could not be given a Roman numeral
//! - `ExportError` - A single snippet file that could not be written
//!
//! ## Usage
//! ```rust,no_run
//! use chord_roman::{analyze_file, AnalysisError, AnalysisOptions, BuiltinEngine};
//! use std::path::Path;
//!
//! let engine = BuiltinEngine::new();
//! match analyze_file(Path::new("song.mid"), &engine, None, &AnalysisOptions::default()) {
//!     Ok(analysis) => println!("{} chords", analysis.chords.len()),
//!     Err(AnalysisError::KeyParse { text, message }) => {
//!         eprintln!("Failed to parse --key '{}': {}", text, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The input file does not exist.
    ///
    /// # Example
    /// ```
    /// # use chord_roman::AnalysisError;
    /// let err = AnalysisError::MissingInput("song.mid".into());
    /// assert_eq!(err.to_string(), "Input file not found: song.mid");
    /// ```
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The key override text could not be turned into a key.
    ///
    /// # Example
    /// ```
    /// # use chord_roman::AnalysisError;
    /// let err = AnalysisError::KeyParse {
    ///     text: "H major".to_string(),
    ///     message: "Unknown tonic 'H'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Failed to parse key 'H major': Unknown tonic 'H'");
    /// ```
    #[error("Failed to parse key '{text}': {message}")]
    KeyParse { text: String, message: String },

    /// The input file was found but could not be read as a score.
    #[error("Failed to read score '{}': {message}", path.display())]
    ScoreParse { path: PathBuf, message: String },

    /// The input file extension is not a supported score format.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// Invalid settings file or settings value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A key name that could not be constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyParseError {
    #[error("Empty key name")]
    Empty,

    #[error("Unknown tonic '{0}'")]
    UnknownTonic(String),
}

/// Key detection found nothing to correlate against.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyDetectionError {
    #[error("Score has no pitched notes")]
    NoNotes,

    #[error("Pitch content is flat, no key stands out")]
    Ambiguous,
}

/// Why a chord group was left out of the analysis.
///
/// This is not a failure of the run: the assembler logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("Unreadable pitch name '{0}'")]
    BadPitch(String),

    #[error("No chord root could be found")]
    NoRoot,
}

/// A single snippet file that could not be written.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pitch name '{0}'")]
    BadPitch(String),

    #[error("Snippet has no pitches")]
    Empty,
}
