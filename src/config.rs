//! # Settings
//!
//! Run settings come from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. An optional YAML settings file (`--config`)
//! 3. Command-line flags
//!
//! ## File format
//! ```yaml
//! grid: 0.5
//! dedupe: true
//! min-notes: 2
//! show-notes: false
//! bpm: 96
//! limit: 40
//! key: A minor
//! export-dir: ./snippets
//! export: true
//! ```
//! Every key is optional; unknown keys are rejected.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analysis::AnalysisOptions;
use crate::error::AnalysisError;
use crate::table::TableOptions;

/// Settings exactly as written in the YAML file
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawSettings {
    pub grid: Option<f64>,
    pub dedupe: Option<bool>,
    pub min_notes: Option<usize>,
    pub show_notes: Option<bool>,
    pub bpm: Option<f64>,
    pub limit: Option<usize>,
    pub key: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub export: Option<bool>,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub grid: f64,
    pub dedupe: bool,
    pub min_notes: usize,
    pub show_notes: bool,
    pub bpm: Option<f64>,
    pub limit: Option<usize>,
    pub key: Option<String>,
    /// Snippet directory; `None` means next to the input file
    pub export_dir: Option<PathBuf>,
    pub export: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let analysis = AnalysisOptions::default();
        let table = TableOptions::default();
        Self {
            grid: analysis.grid,
            dedupe: analysis.dedupe,
            min_notes: analysis.min_notes,
            show_notes: table.show_notes,
            bpm: table.bpm,
            limit: table.limit,
            key: None,
            export_dir: None,
            export: true,
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub grid: Option<f64>,
    pub dedupe: Option<bool>,
    pub min_notes: Option<usize>,
    pub show_notes: Option<bool>,
    pub bpm: Option<f64>,
    pub limit: Option<usize>,
    pub key: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub export: Option<bool>,
}

fn check_grid(grid: f64) -> Result<f64, AnalysisError> {
    if grid.is_finite() {
        Ok(grid)
    } else {
        Err(AnalysisError::Config(format!("grid must be a finite number, got {}", grid)))
    }
}

/// Any finite tempo is accepted; zero or negative just hides the seconds column.
fn check_bpm(bpm: f64) -> Result<f64, AnalysisError> {
    if bpm.is_finite() {
        Ok(bpm)
    } else {
        Err(AnalysisError::Config(format!("bpm must be a finite number, got {}", bpm)))
    }
}

impl Settings {
    /// Parse and validate a YAML settings document.
    ///
    /// # Example
    /// ```
    /// use chord_roman::config::Settings;
    ///
    /// let settings = Settings::from_yaml("grid: 0.5\nmin-notes: 2\n").unwrap();
    /// assert_eq!(settings.grid, 0.5);
    /// assert_eq!(settings.min_notes, 2);
    /// assert!(!settings.dedupe);
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, AnalysisError> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawSettings =
            serde_yaml::from_str(content).map_err(|e| AnalysisError::Config(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawSettings) -> Result<Self, AnalysisError> {
        let defaults = Self::default();
        Ok(Self {
            grid: raw.grid.map(check_grid).transpose()?.unwrap_or(defaults.grid),
            dedupe: raw.dedupe.unwrap_or(defaults.dedupe),
            min_notes: raw.min_notes.unwrap_or(defaults.min_notes),
            show_notes: raw.show_notes.unwrap_or(defaults.show_notes),
            bpm: raw.bpm.map(check_bpm).transpose()?,
            limit: raw.limit,
            key: raw.key,
            export_dir: raw.export_dir,
            export: raw.export.unwrap_or(defaults.export),
        })
    }

    /// Read a settings file from disk.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Layer command-line values on top, validating them the same way as file values.
    pub fn apply(mut self, overrides: SettingsOverrides) -> Result<Self, AnalysisError> {
        if let Some(grid) = overrides.grid {
            self.grid = check_grid(grid)?;
        }
        if let Some(bpm) = overrides.bpm {
            self.bpm = Some(check_bpm(bpm)?);
        }
        if let Some(dedupe) = overrides.dedupe {
            self.dedupe = dedupe;
        }
        if let Some(min_notes) = overrides.min_notes {
            self.min_notes = min_notes;
        }
        if let Some(show_notes) = overrides.show_notes {
            self.show_notes = show_notes;
        }
        if overrides.limit.is_some() {
            self.limit = overrides.limit;
        }
        if overrides.key.is_some() {
            self.key = overrides.key;
        }
        if overrides.export_dir.is_some() {
            self.export_dir = overrides.export_dir;
        }
        if let Some(export) = overrides.export {
            self.export = export;
        }
        Ok(self)
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            grid: self.grid,
            dedupe: self.dedupe,
            min_notes: self.min_notes,
        }
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            show_notes: self.show_notes,
            bpm: self.bpm,
            limit: self.limit,
        }
    }
}
