//! simontui - A Simon memory game for the terminal.
//!
//! This library provides the sequence engine, tone synthesis and playback,
//! preferences and the TUI used by the `simontui` binary.

pub mod app;
pub mod audio;
pub mod game;
pub mod prefs;
pub mod ui;

// Re-export commonly used types
pub use app::App;
pub use audio::{AudioEngine, ToneBank, ToneBuffer, ToneId};
pub use game::{GameEvent, InputOutcome, Phase, SequenceEngine, Signal};
pub use prefs::{JsonPreferences, MemoryPreferences, Preferences, PreferencesStore};
