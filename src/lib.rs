pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod key;
pub mod midi;
pub mod musicxml;
pub mod pitch;
pub mod score;
pub mod table;
pub mod theory;

pub use analysis::{analyze_file, analyze_score, Analysis, AnalysisOptions, AnalyzedChord};
pub use error::*;
pub use export::{export_snippets, ExportReport, MidiSnippetWriter, SnippetWriter};
pub use key::{Key, Mode};
pub use score::{load_score, Score};
pub use table::{render_table, TableOptions};
pub use theory::{BuiltinEngine, HarmonyEngine};

use std::path::Path;

/// Analyze a file with the built-in engine and render the table.
/// This is the main entry point for the library.
pub fn analyze_to_table(
    path: &Path,
    key_text: Option<&str>,
    options: &AnalysisOptions,
    table: &TableOptions,
) -> Result<String, AnalysisError> {
    let analysis = analyze_file(path, &BuiltinEngine::new(), key_text, options)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(render_table(&name, &analysis.key, &analysis.chords, table))
}
