//! Audio output for game sounds.
//!
//! Provides fire-and-forget playback of the synthesized tones through rodio.
//! The game never waits on audio: if no output device can be opened the
//! engine stays silent, and a failed play is logged and dropped.

use super::samples::SampleLibrary;
use super::tone::{ToneBank, ToneId};
use super::AudioError;
use rodio::{OutputStream, OutputStreamHandle, Source};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Sample rate for tone synthesis (44.1 kHz standard).
pub const SAMPLE_RATE: u32 = 44100;

/// How the audio engine should be set up.
#[derive(Debug, Clone)]
pub struct AudioSettings {
    /// Try to open the default output device.
    pub enable_output: bool,
    /// Render the tone bank. When false, sounds come from `sounds_dir`.
    pub synthesize: bool,
    /// Directory with pre-rendered sound files.
    pub sounds_dir: Option<PathBuf>,
    /// Sample rate for the tone bank.
    pub sample_rate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enable_output: true,
            synthesize: true,
            sounds_dir: None,
            sample_rate: SAMPLE_RATE,
        }
    }
}

/// Which source a play request would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayRoute {
    /// Sound is switched off.
    Muted,
    /// The synthesized buffer from the tone bank.
    Synthesized,
    /// A pre-rendered sound file.
    Sample,
    /// Nothing available for this tone.
    Missing,
}

/// A tone buffer as a rodio source.
///
/// Shares the bank's samples, so starting a sound never copies them.
struct ToneSource {
    samples: Arc<[f32]>,
    sample_rate: u32,
    pos: usize,
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.samples.get(self.pos).copied()?;
        self.pos += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.samples.len() - self.pos;
        (left, Some(left))
    }
}

impl Source for ToneSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.samples.len() - self.pos)
    }

    fn channels(&self) -> u16 {
        1 // Mono
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.samples.len() as f64 / self.sample_rate as f64,
        ))
    }
}

/// An open output device.
struct DeviceOutput {
    /// Audio output stream (must be kept alive).
    _stream: OutputStream,
    /// Handle used to start sounds.
    handle: OutputStreamHandle,
}

/// Plays game sounds.
pub struct AudioEngine {
    /// Output device, or None when running silent.
    output: Option<DeviceOutput>,
    /// Synthesized tones, rendered once at startup.
    tones: Option<ToneBank>,
    /// Fallback sound files.
    samples: SampleLibrary,
    /// Master volume in [0, 1].
    volume: f32,
    muted: bool,
}

impl AudioEngine {
    /// Creates an audio engine.
    ///
    /// Never fails: a missing output device or sounds directory is logged
    /// and the engine degrades to silence for whatever is unavailable.
    pub fn new(settings: &AudioSettings) -> Self {
        let output = if settings.enable_output {
            match Self::open_output() {
                Ok(output) => Some(output),
                Err(e) => {
                    tracing::warn!("Audio disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let tones = settings
            .synthesize
            .then(|| ToneBank::new(settings.sample_rate));

        let samples = match &settings.sounds_dir {
            Some(dir) => SampleLibrary::load(dir).unwrap_or_else(|e| {
                tracing::warn!("Sound files unavailable: {}", e);
                SampleLibrary::empty()
            }),
            None => SampleLibrary::empty(),
        };

        Self {
            output,
            tones,
            samples,
            volume: crate::prefs::DEFAULT_VOLUME,
            muted: false,
        }
    }

    fn open_output() -> Result<DeviceOutput, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        tracing::info!("Opened default audio output");
        Ok(DeviceOutput {
            _stream: stream,
            handle,
        })
    }

    /// Whether an output device is open.
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// The synthesized tones, if synthesis is enabled.
    pub fn tones(&self) -> Option<&ToneBank> {
        self.tones.as_ref()
    }

    pub fn samples(&self) -> &SampleLibrary {
        &self.samples
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Sets the master volume, clamped to [0, 1].
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Decides where the sound for `id` would come from.
    ///
    /// Synthesized tones win; sound files are the fallback.
    pub fn route(&self, id: ToneId) -> PlayRoute {
        if self.muted {
            PlayRoute::Muted
        } else if self.tones.is_some() {
            PlayRoute::Synthesized
        } else if self.samples.contains(id) {
            PlayRoute::Sample
        } else {
            PlayRoute::Missing
        }
    }

    /// Starts the sound for `id` at the current volume and returns at once.
    pub fn play(&self, id: ToneId) {
        let Some(output) = &self.output else {
            return;
        };
        if let Err(e) = self.start(output, id) {
            tracing::debug!("Dropped sound {}: {}", id, e);
        }
    }

    fn start(&self, output: &DeviceOutput, id: ToneId) -> Result<(), AudioError> {
        match self.route(id) {
            PlayRoute::Muted | PlayRoute::Missing => Ok(()),
            PlayRoute::Synthesized => {
                let Some(bank) = &self.tones else {
                    return Ok(());
                };
                let buffer = bank.get(id);
                let source = ToneSource {
                    samples: buffer.shared_samples(),
                    sample_rate: buffer.sample_rate(),
                    pos: 0,
                };
                output.handle.play_raw(source.amplify(self.volume))?;
                Ok(())
            }
            PlayRoute::Sample => {
                if let Some(source) = self.samples.decode(id)? {
                    output.handle.play_raw(source.amplify(self.volume))?;
                }
                Ok(())
            }
        }
    }
}
