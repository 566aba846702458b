//! Sound for the game.
//!
//! This module synthesizes the game's tones and plays them. It supports:
//! - Procedural tone generation for each signal and the failure chord
//! - Fire-and-forget playback through rodio
//! - Silent operation when no output device is available
//! - Pre-rendered sound files as a fallback to synthesis
//! - WAV export of the synthesized tones

pub mod engine;
pub mod export;
pub mod samples;
pub mod tone;

pub use engine::{AudioEngine, AudioSettings, PlayRoute, SAMPLE_RATE};
pub use export::export_tones;
pub use samples::{SampleLibrary, DEFAULT_SOUNDS_DIR};
pub use tone::{generate, ToneBank, ToneBuffer, ToneId};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the audio layer.
///
/// None of these are fatal to gameplay; callers log them and carry on.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output available: {0}")]
    Output(#[from] rodio::StreamError),
    #[error("failed to start sound: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("failed to read sound file {path}: {source}")]
    SampleIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode sound '{0}': {1}")]
    Decode(&'static str, String),
}
