//! Procedural tone synthesis.
//!
//! Every sound in the game comes from a closed-form waveform: a decaying sine
//! for each signal, and three detuned low sines for the failure chord. The
//! buffers are rendered once into a [`ToneBank`] and reused for every play.

use crate::game::Signal;
use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

/// Length of a signal tone in seconds.
pub const SIGNAL_TONE_SECS: f64 = 0.3;

/// Length of the failure chord in seconds.
pub const FAILURE_TONE_SECS: f64 = 0.5;

/// Peak gain of a signal tone.
const SIGNAL_GAIN: f64 = 0.3;

/// Exponential decay rate of a signal tone (per second).
const SIGNAL_DECAY: f64 = 3.0;

/// Peak gain applied to the (unnormalized) failure chord.
const FAILURE_GAIN: f64 = 0.2;

/// Exponential decay rate of the failure chord (per second).
const FAILURE_DECAY: f64 = 2.0;

/// Component frequencies of the failure chord in Hz.
const FAILURE_FREQUENCIES: [f64; 3] = [150.0, 200.0, 250.0];

/// Identifies one of the synthesized sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToneId {
    Signal(Signal),
    Failure,
}

impl ToneId {
    /// Every tone the game uses.
    pub const ALL: [ToneId; 5] = [
        ToneId::Signal(Signal::Red),
        ToneId::Signal(Signal::Blue),
        ToneId::Signal(Signal::Green),
        ToneId::Signal(Signal::Yellow),
        ToneId::Failure,
    ];

    /// Asset name, used for sample files and WAV export.
    pub fn name(self) -> &'static str {
        match self {
            ToneId::Signal(signal) => signal.name(),
            ToneId::Failure => "wrong",
        }
    }

    fn slot(self) -> usize {
        match self {
            ToneId::Signal(signal) => signal.index(),
            ToneId::Failure => 4,
        }
    }
}

impl From<Signal> for ToneId {
    fn from(signal: Signal) -> Self {
        ToneId::Signal(signal)
    }
}

impl fmt::Display for ToneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pitch of each signal's tone in Hz (A3, C#4, E4, G4).
pub fn signal_frequency(signal: Signal) -> f64 {
    match signal {
        Signal::Red => 220.0,
        Signal::Green => 277.0,
        Signal::Yellow => 330.0,
        Signal::Blue => 392.0,
    }
}

/// An immutable mono sample buffer.
///
/// Cloning is cheap; clones share the same samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl ToneBuffer {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Shared handle to the samples, for playback without copying.
    pub fn shared_samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playing time in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Number of samples for `secs` seconds at `sample_rate`, rounded.
fn sample_count(sample_rate: u32, secs: f64) -> usize {
    (sample_rate as f64 * secs).round() as usize
}

/// Renders `secs` seconds of `f(t)` at `sample_rate`.
fn render(sample_rate: u32, secs: f64, f: impl Fn(f64) -> f64) -> ToneBuffer {
    let sr = sample_rate as f64;
    let samples: Arc<[f32]> = (0..sample_count(sample_rate, secs))
        .map(|i| f(i as f64 / sr) as f32)
        .collect();
    ToneBuffer {
        samples,
        sample_rate,
    }
}

/// Synthesizes the buffer for `id`.
///
/// This is a pure function of its arguments: the same id and sample rate
/// always produce bit-identical output.
pub fn generate(id: ToneId, sample_rate: u32) -> ToneBuffer {
    match id {
        ToneId::Signal(signal) => {
            let freq = signal_frequency(signal);
            render(sample_rate, SIGNAL_TONE_SECS, |t| {
                (TAU * freq * t).sin() * (-SIGNAL_DECAY * t).exp() * SIGNAL_GAIN
            })
        }
        ToneId::Failure => render(sample_rate, FAILURE_TONE_SECS, |t| {
            let chord: f64 = FAILURE_FREQUENCIES
                .iter()
                .map(|freq| (TAU * freq * t).sin())
                .sum();
            chord * (-FAILURE_DECAY * t).exp() * FAILURE_GAIN
        }),
    }
}

/// Every tone, rendered once at a fixed sample rate.
#[derive(Debug, Clone)]
pub struct ToneBank {
    sample_rate: u32,
    tones: [ToneBuffer; 5],
}

impl ToneBank {
    /// Renders all tones. Do this at startup, not on the input path.
    pub fn new(sample_rate: u32) -> Self {
        let tones = ToneId::ALL.map(|id| generate(id, sample_rate));
        tracing::debug!(sample_rate, "Rendered tone bank");
        Self { sample_rate, tones }
    }

    pub fn get(&self, id: ToneId) -> &ToneBuffer {
        &self.tones[id.slot()]
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Iterates over `(id, buffer)` pairs in [`ToneId::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ToneId, &ToneBuffer)> {
        ToneId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;

    #[test]
    fn test_buffer_lengths() {
        assert_eq!(generate(ToneId::Failure, SR).len(), 22050);
        for signal in Signal::ALL {
            assert_eq!(generate(signal.into(), SR).len(), 13230);
        }
        // Rounding, not truncation.
        assert_eq!(generate(ToneId::Failure, 22051).len(), 11026);
        assert_eq!(generate(ToneId::Signal(Signal::Red), 8001).len(), 2400);
    }

    #[test]
    fn test_generate_is_deterministic() {
        for id in ToneId::ALL {
            let a = generate(id, SR);
            let b = generate(id, SR);
            assert!(a
                .samples()
                .iter()
                .zip(b.samples())
                .all(|(x, y)| x.to_bits() == y.to_bits()));
        }
    }

    #[test]
    fn test_signal_tone_shape() {
        let tone = generate(ToneId::Signal(Signal::Blue), SR);
        assert_eq!(tone.samples()[0], 0.0);
        let peak = tone.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 0.3 && peak > 0.25, "peak was {}", peak);

        // The envelope decays: the tail is quieter than the head.
        let head = tone.samples()[..1000].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = tone.samples()[tone.len() - 1000..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail < head * 0.5);
    }

    #[test]
    fn test_signal_tone_matches_formula() {
        let tone = generate(ToneId::Signal(Signal::Green), SR);
        let i = 1234;
        let t = i as f64 / SR as f64;
        let expected = ((TAU * 277.0 * t).sin() * (-3.0 * t).exp() * 0.3) as f32;
        assert_eq!(tone.samples()[i], expected);
    }

    #[test]
    fn test_failure_chord_is_not_normalized() {
        let tone = generate(ToneId::Failure, SR);
        let peak = tone.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
        // Three unit sines at 0.2 gain can exceed any single component.
        assert!(peak > 0.2, "peak was {}", peak);
        assert!(peak <= 0.6);
    }

    #[test]
    fn test_signal_frequencies_distinct() {
        let mut freqs: Vec<u32> = Signal::ALL
            .iter()
            .map(|s| signal_frequency(*s) as u32)
            .collect();
        freqs.sort_unstable();
        freqs.dedup();
        assert_eq!(freqs.len(), 4);
    }

    #[test]
    fn test_bank_lookup() {
        let bank = ToneBank::new(SR);
        assert_eq!(bank.get(ToneId::Failure), &generate(ToneId::Failure, SR));
        assert_eq!(
            bank.get(Signal::Yellow.into()),
            &generate(ToneId::Signal(Signal::Yellow), SR)
        );
        assert_eq!(bank.iter().count(), 5);
        assert!((bank.get(ToneId::Failure).duration_secs() - 0.5).abs() < 1e-9);
    }
}
