//! simontui - A Simon memory game for the terminal.
//!
//! The game plays a growing sequence of colored pads with a tone for each,
//! and the player repeats it from memory. One new pad is added every round
//! until the player makes a mistake.
//!
//! # Usage
//!
//! ```bash
//! cargo run                              # Play with synthesized sounds
//! cargo run -- --seed 42                 # Reproducible sequence
//! cargo run -- --export-sounds sounds    # Write the tones as WAV files and exit
//! cargo run -- --no-synth --sounds sounds
//! ```
//!
//! Press `?` for help with keyboard shortcuts.

use simontui::app::App;
use simontui::audio::{
    export_tones, AudioEngine, AudioSettings, ToneBank, DEFAULT_SOUNDS_DIR, SAMPLE_RATE,
};
use simontui::game::{Rng, SequenceEngine};
use simontui::prefs::{
    JsonPreferences, MemoryPreferences, Preferences, PreferencesStore, DEFAULT_PREFS_PATH,
};
use simontui::ui;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Instant;

/// Command-line options for the application.
struct CliOptions {
    /// Seed for the signal generator.
    seed: Option<u128>,
    /// Preferences file.
    prefs_path: PathBuf,
    /// Keep preferences in memory only.
    no_save: bool,
    /// Directory with fallback sound files.
    sounds_dir: Option<PathBuf>,
    /// Skip tone synthesis and use sound files.
    no_synth: bool,
    /// Do not open an audio device.
    silent: bool,
    /// Write the tones to this directory and exit.
    export_dir: Option<PathBuf>,
}

/// Returns the value following an option, or exits with an error.
fn option_value(args: &[String], i: usize, name: &str) -> String {
    match args.get(i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires an argument", name);
            std::process::exit(1);
        }
    }
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - `--seed <n>`: Seed the signal generator
    /// - `--prefs <path>`: Preferences file location
    /// - `--no-save`: Do not write preferences
    /// - `--sounds <dir>`: Directory with fallback sound files
    /// - `--no-synth`: Use sound files instead of synthesized tones
    /// - `--silent`: Run without audio output
    /// - `--export-sounds <dir>`: Write the tones as WAV files and exit
    /// - `--help` or `-h`: Print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut options = Self {
            seed: None,
            prefs_path: PathBuf::from(DEFAULT_PREFS_PATH),
            no_save: false,
            sounds_dir: None,
            no_synth: false,
            silent: false,
            export_dir: None,
        };
        let mut i = 1;

        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    i += 1;
                    let value = option_value(&args, i, "--seed");
                    let seed = value
                        .parse()
                        .with_context(|| format!("Invalid seed: {}", value))?;
                    options.seed = Some(seed);
                }
                "--prefs" => {
                    i += 1;
                    options.prefs_path = PathBuf::from(option_value(&args, i, "--prefs"));
                }
                "--no-save" => options.no_save = true,
                "--sounds" => {
                    i += 1;
                    options.sounds_dir = Some(PathBuf::from(option_value(&args, i, "--sounds")));
                }
                "--no-synth" => options.no_synth = true,
                "--silent" => options.silent = true,
                "--export-sounds" => {
                    i += 1;
                    options.export_dir =
                        Some(PathBuf::from(option_value(&args, i, "--export-sounds")));
                }
                "--help" | "-h" => {
                    eprintln!("simontui - Simon memory game for the terminal");
                    eprintln!();
                    eprintln!(
                        "Usage: {} [OPTIONS]",
                        args.first().map(String::as_str).unwrap_or("simontui")
                    );
                    eprintln!();
                    eprintln!("Options:");
                    eprintln!("  --seed N                Seed the sequence (reproducible games)");
                    eprintln!(
                        "  --prefs PATH            Preferences file (default: {})",
                        DEFAULT_PREFS_PATH
                    );
                    eprintln!("  --no-save               Do not write preferences");
                    eprintln!("  --sounds DIR            Directory with red/green/yellow/blue/wrong sound files");
                    eprintln!("  --no-synth              Play sound files instead of synthesized tones");
                    eprintln!("  --silent                Run without audio output");
                    eprintln!("  --export-sounds DIR     Write the tones as WAV files and exit");
                    eprintln!("  -h, --help              Print this help message");
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown option: {}", other);
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
            i += 1;
        }

        Ok(options)
    }
}

/// Main entry point.
fn main() -> Result<()> {
    // Parse CLI options first (before any terminal setup)
    let cli = CliOptions::parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Some(dir) = &cli.export_dir {
        let paths = export_tones(&ToneBank::new(SAMPLE_RATE), dir)?;
        for path in paths {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let prefs: Box<dyn PreferencesStore> = if cli.no_save {
        let initial = JsonPreferences::load_from_file(&cli.prefs_path).unwrap_or_else(|e| {
            tracing::debug!("Starting from default preferences: {}", e);
            Preferences::default()
        });
        Box::new(MemoryPreferences::new(initial))
    } else {
        let store = JsonPreferences::open(&cli.prefs_path);
        tracing::info!("Preferences file: {}", store.path().display());
        Box::new(store)
    };

    let rng = match cli.seed {
        Some(seed) => Rng::new_with_seed(seed),
        None => Rng::from_entropy(),
    };

    let no_synth = cli.no_synth;
    let sounds_dir = cli
        .sounds_dir
        .or_else(|| no_synth.then(|| PathBuf::from(DEFAULT_SOUNDS_DIR)));
    let audio = AudioEngine::new(&AudioSettings {
        enable_output: !cli.silent,
        synthesize: !no_synth,
        sounds_dir,
        sample_rate: SAMPLE_RATE,
    });

    let mut app = App::new(SequenceEngine::new(rng, prefs), audio);

    let mut terminal = setup_terminal().context("Failed to setup terminal")?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;

    // Handle any errors from the main loop
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Fire due playback timers
        app.update();

        terminal.draw(|frame| ui::render(frame, app))?;

        // Wake in time for the next playback timer
        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press && app.handle_key(key.code, key.modifiers) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                        app.handle_mouse_click(mouse.column, mouse.row);
                    }
                }
                _ => {}
            }
        }
    }
}
