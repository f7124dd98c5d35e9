use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chord_roman::config::{Settings, SettingsOverrides};
use chord_roman::export::default_export_dir;
use chord_roman::{analyze_file, export_snippets, render_table, BuiltinEngine, MidiSnippetWriter};

#[derive(Parser, Debug)]
#[command(name = "chord-roman")]
#[command(about = "Analyze the chords of a MIDI or MusicXML file and print Roman numerals")]
struct Cli {
    /// Input file (.mid, .midi, .musicxml, .xml)
    input: PathBuf,

    /// Override the detected key, e.g. "C major", "A minor", "Am"
    #[arg(long)]
    key: Option<String>,

    /// Quantization grid in quarter notes (1.0=quarter, 0.5=eighth, 0.25=sixteenth; 0 disables)
    #[arg(long, allow_negative_numbers = true)]
    grid: Option<f64>,

    /// Collapse consecutive identical Roman numerals
    #[arg(long)]
    dedupe: bool,

    /// Minimum number of distinct notes for a chord (2 allows dyads) [default: 3]
    #[arg(long)]
    min_notes: Option<usize>,

    /// Show pitch names for each chord (default)
    #[arg(long, overrides_with = "no_notes")]
    show_notes: bool,

    /// Hide pitch names
    #[arg(long, overrides_with = "show_notes")]
    no_notes: bool,

    /// Tempo used to show onsets in seconds (display only)
    #[arg(long)]
    bpm: Option<f64>,

    /// Limit the number of printed chords
    #[arg(long)]
    limit: Option<usize>,

    /// Directory for per-chord MIDI snippets [default: <input stem>_chords next to the input]
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Do not write per-chord MIDI snippets
    #[arg(long)]
    no_export: bool,

    /// YAML settings file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        let show_notes = if self.no_notes {
            Some(false)
        } else if self.show_notes {
            Some(true)
        } else {
            None
        };
        SettingsOverrides {
            grid: self.grid,
            dedupe: self.dedupe.then_some(true),
            min_notes: self.min_notes,
            show_notes,
            bpm: self.bpm,
            limit: self.limit,
            key: self.key.clone(),
            export_dir: self.export_dir.clone(),
            export: self.no_export.then_some(false),
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Settings: defaults, then file, then flags
    let base = match &cli.config {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    };
    let settings = match base.and_then(|s| s.apply(cli.overrides())) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Analyze
    let engine = BuiltinEngine::new();
    let analysis = match analyze_file(
        &cli.input,
        &engine,
        settings.key.as_deref(),
        &settings.analysis_options(),
    ) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Effective key: {}", analysis.key);

    // Export snippets
    if settings.export {
        let dir = settings
            .export_dir
            .clone()
            .unwrap_or_else(|| default_export_dir(&cli.input));
        let report = export_snippets(&dir, &analysis.chords, &MidiSnippetWriter);
        for (path, e) in &report.failures {
            eprintln!("Warning: failed exporting {}: {}", path.display(), e);
        }
    }

    // Output
    let file_name = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    print!(
        "{}",
        render_table(&file_name, &analysis.key, &analysis.chords, &settings.table_options())
    );

    ExitCode::SUCCESS
}
