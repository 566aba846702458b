//! The four colored signals on the board.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four discrete colored stimuli.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Signal {
    /// All signals, in the order used for random selection.
    pub const ALL: [Signal; 4] = [Signal::Red, Signal::Blue, Signal::Green, Signal::Yellow];

    /// Returns the signal at `index` in [`Signal::ALL`], if any.
    pub fn from_index(index: usize) -> Option<Signal> {
        Self::ALL.get(index).copied()
    }

    /// Position of this signal in [`Signal::ALL`].
    pub fn index(self) -> usize {
        match self {
            Signal::Red => 0,
            Signal::Blue => 1,
            Signal::Green => 2,
            Signal::Yellow => 3,
        }
    }

    /// Lowercase name, also used to look up sound assets.
    pub fn name(self) -> &'static str {
        match self {
            Signal::Red => "red",
            Signal::Blue => "blue",
            Signal::Green => "green",
            Signal::Yellow => "yellow",
        }
    }

    /// Maps a key to a signal: the color's initial or a digit 1-4.
    ///
    /// Digits follow the board layout: green top-left, red top-right,
    /// yellow bottom-left, blue bottom-right.
    pub fn from_key(key: char) -> Option<Signal> {
        match key.to_ascii_lowercase() {
            'g' | '1' => Some(Signal::Green),
            'r' | '2' => Some(Signal::Red),
            'y' | '3' => Some(Signal::Yellow),
            'b' | '4' => Some(Signal::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
