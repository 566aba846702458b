//! The Simon game loop.
//!
//! This module contains everything that decides what happens in a game:
//! - The four signals the board can show
//! - A seedable random source for picking the next signal
//! - The playback script that paces the replay of a pattern
//! - The sequence engine that owns the session and validates input

pub mod engine;
pub mod playback;
pub mod rng;
pub mod signal;

pub use engine::{GameEvent, GameSession, InputOutcome, Phase, SequenceEngine};
pub use playback::{Cue, PlaybackScript, PlaybackStep};
pub use rng::Rng;
pub use signal::Signal;

use std::time::Duration;

/// Delay before the first signal of a round is shown.
pub const INITIAL_DELAY: Duration = Duration::from_millis(500);

/// How long each signal stays lit during playback.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(300);

/// Gap between one signal going dark and the next lighting up.
pub const INTER_SIGNAL_GAP: Duration = Duration::from_millis(300);

/// Pause between a completed round and the start of the next playback.
pub const ROUND_PAUSE: Duration = Duration::from_millis(1000);

/// Total time needed to replay a pattern of `len` signals.
///
/// Input opens as soon as the last signal goes dark, so there is no
/// trailing gap.
pub fn playback_duration(len: usize) -> Duration {
    if len == 0 {
        return Duration::ZERO;
    }
    let len = len as u32;
    INITIAL_DELAY + HIGHLIGHT_DURATION * len + INTER_SIGNAL_GAP * (len - 1)
}
