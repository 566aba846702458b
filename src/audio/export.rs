//! Audio export functionality.
//!
//! Writes the synthesized tones to WAV files named after each tone, so they
//! can be edited or used as the sound-file fallback.

use super::tone::{ToneBank, ToneBuffer};
use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes one tone buffer to a 16-bit mono WAV file.
///
/// Samples outside [-1, 1] (the failure chord can get there) are clipped.
///
/// # Arguments
///
/// * `buffer` - The tone to write
/// * `output_path` - Path for the output WAV file
pub fn export_to_wav<P: AsRef<Path>>(buffer: &ToneBuffer, output_path: P) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(output_path.as_ref(), spec).with_context(|| {
        format!(
            "Failed to create output WAV file: {}",
            output_path.as_ref().display()
        )
    })?;

    for sample in buffer.samples() {
        // Convert f32 (-1.0 to 1.0) to i16
        let value = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(value)?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

/// Exports every tone in the bank into `dir` as `<name>.wav`.
///
/// Creates `dir` if needed and returns the written paths in bank order.
pub fn export_tones<P: AsRef<Path>>(bank: &ToneBank, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut written = Vec::new();
    for (id, buffer) in bank.iter() {
        let path = dir.join(format!("{}.wav", id.name()));
        export_to_wav(buffer, &path)?;
        tracing::info!("Exported {} to {:?}", id, path);
        written.push(path);
    }
    Ok(written)
}
