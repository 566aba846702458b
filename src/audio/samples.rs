//! Pre-rendered sound files used when tones are not synthesized.
//!
//! Files are looked up by tone name (`red`, `blue`, `green`, `yellow`,
//! `wrong`) with any extension. Their bytes are read once at startup and
//! decoded on each play with rodio's format-sniffing decoder, so any format
//! rodio understands will work.

use super::tone::ToneId;
use super::AudioError;
use rodio::{Decoder, Source};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default directory searched for sound files.
pub const DEFAULT_SOUNDS_DIR: &str = "sounds";

/// Raw sound file contents keyed by tone.
#[derive(Debug, Clone, Default)]
pub struct SampleLibrary {
    samples: HashMap<ToneId, Arc<[u8]>>,
}

impl SampleLibrary {
    /// An empty library; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads whatever sound files exist in `dir`.
    ///
    /// Missing files are logged and skipped. Only an unreadable directory is
    /// an error.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, AudioError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| AudioError::SampleIo {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut samples = HashMap::new();
        for id in ToneId::ALL {
            let found = paths
                .iter()
                .find(|path| path.file_stem().and_then(|s| s.to_str()) == Some(id.name()));
            match found {
                Some(path) => {
                    let bytes = fs::read(path).map_err(|source| AudioError::SampleIo {
                        path: path.clone(),
                        source,
                    })?;
                    tracing::debug!("Loaded sound {} from {:?}", id, path);
                    samples.insert(id, Arc::from(bytes));
                }
                None => tracing::warn!("No sound file for '{}' in {:?}", id, dir),
            }
        }

        Ok(Self { samples })
    }

    pub fn contains(&self, id: ToneId) -> bool {
        self.samples.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Decodes the sample for `id` into a playable source.
    pub fn decode(
        &self,
        id: ToneId,
    ) -> Result<Option<impl Source<Item = f32> + Send + 'static>, AudioError> {
        let Some(bytes) = self.samples.get(&id) else {
            return Ok(None);
        };
        let decoder = Decoder::new(Cursor::new(Arc::clone(bytes)))
            .map_err(|e| AudioError::Decode(id.name(), e.to_string()))?;
        Ok(Some(decoder.convert_samples::<f32>()))
    }
}
