//! Catalog backed by a Directus-style headless CMS.
//!
//! Tracks come from `GET {base}/items/tracks?fields=*,audio_file.*` and the
//! audio itself from `{base}/assets/{file_id}`.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use super::catalog::{Catalog, CatalogError};
use super::display::display_name;
use super::model::{SourceLocator, Track};

#[derive(Debug, Deserialize)]
struct RemoteFile {
    id: String,
    #[serde(default)]
    filename_download: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteTrack {
    id: u64,
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    bpm: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default, rename = "loop")]
    loop_default: Option<bool>,
    #[serde(default)]
    audio_file: Option<RemoteFile>,
    #[serde(default)]
    waveform_data: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct TracksResponse {
    data: Vec<RemoteTrack>,
}

pub struct RemoteCatalog {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl RemoteCatalog {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn file_url(&self, file_id: &str) -> String {
        format!("{}/assets/{}", self.base_url, file_id)
    }

    /// Turn a tracks response body into catalog entries. Entries without an
    /// attached audio file cannot be played and are skipped.
    pub fn parse_tracks(&self, body: &str) -> Result<Vec<Track>, CatalogError> {
        let response: TracksResponse =
            serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let tracks = response
            .data
            .into_iter()
            .filter_map(|t| {
                let Some(file) = t.audio_file else {
                    warn!(track = t.id, title = %t.title, "remote track has no audio file");
                    return None;
                };
                let title = if t.title.trim().is_empty() {
                    file.filename_download.clone().unwrap_or_else(|| file.id.clone())
                } else {
                    t.title
                };
                Some(Track {
                    id: t.id,
                    display: display_name(&title, t.author.as_deref()),
                    source: SourceLocator::Url(self.file_url(&file.id)),
                    declared_length: t
                        .length
                        .filter(|l| l.is_finite() && *l >= 0.0)
                        .map(Duration::from_secs_f64),
                    loop_default: t.loop_default.unwrap_or(false),
                    title,
                    author: t.author,
                    key: t.key,
                    bpm: t.bpm,
                    waveform: t.waveform_data,
                })
            })
            .collect();
        Ok(tracks)
    }
}

impl Catalog for RemoteCatalog {
    fn tracks(&self) -> Result<Vec<Track>, CatalogError> {
        let url = format!("{}/items/tracks?fields=*,audio_file.*", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("Content-Type", "application/json")
            .send()
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Http(format!("HTTP error! status: {}", status.as_u16())));
        }

        let body = response
            .text()
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        let tracks = self.parse_tracks(&body)?;
        info!(base = %self.base_url, count = tracks.len(), "remote catalog fetched");
        Ok(tracks)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
