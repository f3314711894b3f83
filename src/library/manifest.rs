//! Static track lists described by a `sampledeck.toml` manifest.
//!
//! ```toml
//! [[track]]
//! title = "drumbreak"
//! author = "val"
//! src = "drumbreak 21 84bpm.wav"
//! loop = true
//! bpm = "84"
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::catalog::{Catalog, CatalogError};
use super::display::display_name;
use super::model::{SourceLocator, Track};

pub const MANIFEST_FILE: &str = "sampledeck.toml";

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default, rename = "track")]
    tracks: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    title: String,
    #[serde(default)]
    author: Option<String>,
    src: String,
    #[serde(default, rename = "loop")]
    loop_default: bool,
    #[serde(default)]
    bpm: Option<String>,
    #[serde(default)]
    key: Option<String>,
    /// Declared length in seconds.
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    waveform: Option<Vec<f32>>,
}

pub struct ManifestCatalog {
    path: PathBuf,
}

impl ManifestCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parse manifest text. Relative `src` entries resolve against the
    /// manifest's own directory.
    pub fn parse(&self, text: &str) -> Result<Vec<Track>, CatalogError> {
        let file: ManifestFile =
            toml::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let base = self.path.parent();

        let tracks = file
            .tracks
            .into_iter()
            .enumerate()
            .map(|(i, e)| Track {
                id: i as u64 + 1,
                display: display_name(&e.title, e.author.as_deref()),
                source: SourceLocator::parse(&e.src, base),
                declared_length: e
                    .length
                    .filter(|l| l.is_finite() && *l >= 0.0)
                    .map(Duration::from_secs_f64),
                loop_default: e.loop_default,
                title: e.title,
                author: e.author,
                key: e.key,
                bpm: e.bpm,
                waveform: e.waveform,
            })
            .collect::<Vec<_>>();

        debug!(path = %self.path.display(), count = tracks.len(), "manifest parsed");
        Ok(tracks)
    }
}

impl Catalog for ManifestCatalog {
    fn tracks(&self) -> Result<Vec<Track>, CatalogError> {
        let text = fs::read_to_string(&self.path)?;
        self.parse(&text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
