//! Pacing for the replay of a pattern.
//!
//! A [`PlaybackScript`] turns a pattern into a finite sequence of timed
//! steps. The engine pulls one step at a time and arms a timer for it, so
//! nothing here sleeps or blocks.

use super::{Signal, HIGHLIGHT_DURATION, INITIAL_DELAY, INTER_SIGNAL_GAP};
use std::time::Duration;

/// What happens when a playback step comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Light the signal and sound its tone.
    Activate(Signal),
    /// Turn the signal off.
    Deactivate(Signal),
}

/// A single step: wait `delay` after the previous step, then apply `cue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStep {
    pub delay: Duration,
    pub cue: Cue,
}

/// Lazy, restartable iterator over the steps that replay a pattern.
#[derive(Debug, Clone)]
pub struct PlaybackScript {
    pattern: Vec<Signal>,
    /// Index into the flattened activate/deactivate sequence.
    cursor: usize,
}

impl PlaybackScript {
    /// Creates a script for a snapshot of `pattern`.
    pub fn new(pattern: &[Signal]) -> Self {
        Self {
            pattern: pattern.to_vec(),
            cursor: 0,
        }
    }

    /// Rewinds to the first step.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    /// Number of steps not yet produced.
    pub fn remaining(&self) -> usize {
        self.pattern.len() * 2 - self.cursor
    }
}

impl Iterator for PlaybackScript {
    type Item = PlaybackStep;

    fn next(&mut self) -> Option<PlaybackStep> {
        let signal = *self.pattern.get(self.cursor / 2)?;
        let step = if self.cursor % 2 == 0 {
            let delay = if self.cursor == 0 {
                INITIAL_DELAY
            } else {
                INTER_SIGNAL_GAP
            };
            PlaybackStep {
                delay,
                cue: Cue::Activate(signal),
            }
        } else {
            PlaybackStep {
                delay: HIGHLIGHT_DURATION,
                cue: Cue::Deactivate(signal),
            }
        };
        self.cursor += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for PlaybackScript {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::playback_duration;

    #[test]
    fn test_empty_pattern_has_no_steps() {
        let mut script = PlaybackScript::new(&[]);
        assert_eq!(script.next(), None);
    }

    #[test]
    fn test_step_order_and_delays() {
        let steps: Vec<_> = PlaybackScript::new(&[Signal::Red, Signal::Blue]).collect();
        assert_eq!(
            steps,
            vec![
                PlaybackStep {
                    delay: INITIAL_DELAY,
                    cue: Cue::Activate(Signal::Red)
                },
                PlaybackStep {
                    delay: HIGHLIGHT_DURATION,
                    cue: Cue::Deactivate(Signal::Red)
                },
                PlaybackStep {
                    delay: INTER_SIGNAL_GAP,
                    cue: Cue::Activate(Signal::Blue)
                },
                PlaybackStep {
                    delay: HIGHLIGHT_DURATION,
                    cue: Cue::Deactivate(Signal::Blue)
                },
            ]
        );
    }

    #[test]
    fn test_total_delay_matches_playback_duration() {
        let pattern = [Signal::Green, Signal::Green, Signal::Yellow, Signal::Red];
        let total: Duration = PlaybackScript::new(&pattern).map(|s| s.delay).sum();
        assert_eq!(total, playback_duration(pattern.len()));
    }

    #[test]
    fn test_restart_replays_from_the_top() {
        let mut script = PlaybackScript::new(&[Signal::Yellow]);
        let first: Vec<_> = script.by_ref().collect();
        assert_eq!(script.len(), 0);
        script.restart();
        let second: Vec<_> = script.collect();
        assert_eq!(first, second);
    }
}
