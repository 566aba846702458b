//! Persisted player preferences.
//!
//! The game reads and writes a handful of values that outlive a session:
//! the high score, the mute flag, the master volume and the color theme.
//! Access goes through the [`PreferencesStore`] trait so the sequence engine
//! never touches the filesystem directly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the preferences file.
pub const DEFAULT_PREFS_PATH: &str = ".simon-prefs.json";

/// Volume used when nothing has been saved yet.
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Errors that can occur while persisting preferences.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to access preferences file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// Color theme for the terminal board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Returns the other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// The persisted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Best final score ever recorded.
    pub high_score: u32,
    /// Whether sound is switched off.
    pub muted: bool,
    /// Master volume in [0, 1].
    pub volume: f32,
    /// Board color theme.
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            high_score: 0,
            muted: false,
            volume: DEFAULT_VOLUME,
            theme: Theme::default(),
        }
    }
}

/// Narrow port through which the game reads and writes preferences.
///
/// Setters persist immediately. Callers treat a failed write as non-fatal:
/// the in-memory value is still updated.
pub trait PreferencesStore {
    /// Returns the current values.
    fn preferences(&self) -> &Preferences;

    /// Replaces the current values and persists them.
    fn store(&mut self, preferences: Preferences) -> Result<(), PreferencesError>;

    fn high_score(&self) -> u32 {
        self.preferences().high_score
    }

    fn set_high_score(&mut self, score: u32) -> Result<(), PreferencesError> {
        let mut prefs = self.preferences().clone();
        prefs.high_score = score;
        self.store(prefs)
    }

    fn muted(&self) -> bool {
        self.preferences().muted
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), PreferencesError> {
        let mut prefs = self.preferences().clone();
        prefs.muted = muted;
        self.store(prefs)
    }

    fn volume(&self) -> f32 {
        self.preferences().volume
    }

    /// Sets the volume, clamped to [0, 1].
    fn set_volume(&mut self, volume: f32) -> Result<(), PreferencesError> {
        let mut prefs = self.preferences().clone();
        prefs.volume = volume.clamp(0.0, 1.0);
        self.store(prefs)
    }

    fn theme(&self) -> Theme {
        self.preferences().theme
    }

    fn set_theme(&mut self, theme: Theme) -> Result<(), PreferencesError> {
        let mut prefs = self.preferences().clone();
        prefs.theme = theme;
        self.store(prefs)
    }
}

/// Preferences kept only in memory. Used for tests and `--no-save`.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    prefs: Preferences,
}

impl MemoryPreferences {
    pub fn new(prefs: Preferences) -> Self {
        Self { prefs }
    }
}

impl PreferencesStore for MemoryPreferences {
    fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    fn store(&mut self, preferences: Preferences) -> Result<(), PreferencesError> {
        self.prefs = preferences;
        Ok(())
    }
}

/// Preferences backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonPreferences {
    path: PathBuf,
    prefs: Preferences,
}

impl JsonPreferences {
    /// Opens the preferences file at `path`.
    ///
    /// A missing or unreadable file yields defaults; the file is created on
    /// the first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let prefs = match Self::load_from_file(&path) {
            Ok(prefs) => prefs,
            Err(PreferencesError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Preferences::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences: {}", e);
                Preferences::default()
            }
        };
        Self { path, prefs }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads preferences from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Preferences, PreferencesError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| PreferencesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut prefs: Preferences = serde_json::from_str(&json)?;
        prefs.volume = prefs.volume.clamp(0.0, 1.0);
        Ok(prefs)
    }

    /// Writes preferences to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(
        prefs: &Preferences,
        path: P,
    ) -> Result<(), PreferencesError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(prefs)?;
        fs::write(path, json).map_err(|source| PreferencesError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl PreferencesStore for JsonPreferences {
    fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    fn store(&mut self, preferences: Preferences) -> Result<(), PreferencesError> {
        self.prefs = preferences;
        Self::save_to_file(&self.prefs, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.high_score, 0);
        assert!(!prefs.muted);
        assert!((prefs.volume - 0.7).abs() < f32::EPSILON);
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut store = MemoryPreferences::default();
        store.set_volume(1.8).unwrap();
        assert_eq!(store.volume(), 1.0);
        store.set_volume(-0.3).unwrap();
        assert_eq!(store.volume(), 0.0);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferences::open(dir.path().join("prefs.json"));
        assert_eq!(store.preferences(), &Preferences::default());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = JsonPreferences::open(&path);
        store.set_high_score(12).unwrap();
        store.set_muted(true).unwrap();
        store.set_theme(Theme::Dark).unwrap();

        let reopened = JsonPreferences::open(&path);
        assert_eq!(reopened.path(), path.as_path());
        assert_eq!(reopened.high_score(), 12);
        assert!(reopened.muted());
        assert_eq!(reopened.theme(), Theme::Dark);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonPreferences::open(&path);
        assert_eq!(store.high_score(), 0);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{ "high_score": 5 }"#).unwrap();

        let store = JsonPreferences::open(&path);
        assert_eq!(store.high_score(), 5);
        assert!((store.volume() - DEFAULT_VOLUME).abs() < f32::EPSILON);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonPreferences::open(dir.path().join("nope").join("prefs.json"));
        let err = store.set_high_score(3).unwrap_err();
        assert!(matches!(err, PreferencesError::Io { .. }));
        // The in-memory value still changes.
        assert_eq!(store.high_score(), 3);
    }
}
