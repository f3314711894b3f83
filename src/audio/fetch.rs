//! The decoder/fetcher: source locator in, fully decoded buffer out.
//!
//! Fetching is a single attempt. Local paths are read from disk, URLs are
//! fetched over HTTP. Nothing here touches controller state; callers
//! decide whether a result is still wanted.

use std::fs;
use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, Source};
use tracing::{debug, warn};

use crate::config::AudioSettings;
use crate::library::{SourceLocator, Track};

use super::buffer::DecodedBuffer;
use super::types::LoadError;

/// Anything able to turn a track into decoded audio.
pub trait Fetcher: Send + Sync + 'static {
    fn load(&self, track: &Track) -> Result<DecodedBuffer, LoadError>;
}

/// Fetcher for local files and `http(s)` URLs.
pub struct SourceFetcher {
    http: reqwest::blocking::Client,
}

impl SourceFetcher {
    pub fn new(settings: &AudioSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(ms) = settings.http_connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        // No overall timeout: a hung transfer keeps the track loading.
        builder = builder.timeout(None::<Duration>);
        Ok(Self {
            http: builder.build()?,
        })
    }

    fn fetch_bytes(&self, locator: &SourceLocator) -> Result<Vec<u8>, LoadError> {
        let fail = |reason: String| LoadError::Fetch {
            locator: locator.to_string(),
            reason,
        };

        match locator {
            SourceLocator::Path(path) => fs::read(path).map_err(|e| fail(e.to_string())),
            SourceLocator::Url(url) => {
                let response = self.http.get(url).send().map_err(|e| fail(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(fail(format!("HTTP error! status: {}", status.as_u16())));
                }
                response
                    .bytes()
                    .map(|b| b.to_vec())
                    .map_err(|e| fail(e.to_string()))
            }
        }
    }
}

impl Fetcher for SourceFetcher {
    fn load(&self, track: &Track) -> Result<DecodedBuffer, LoadError> {
        let bytes = self.fetch_bytes(&track.source)?;
        debug!(track = track.id, bytes = bytes.len(), "fetched track bytes");

        decode_bytes(bytes).map_err(|reason| {
            warn!(track = track.id, %reason, "decode failed");
            LoadError::Decode {
                locator: track.source.to_string(),
                reason,
            }
        })
    }
}

/// Decode a complete in-memory payload into interleaved `f32` samples.
///
/// Fails on unrecognised formats and on payloads that decode to no frames.
pub fn decode_bytes(bytes: Vec<u8>) -> Result<DecodedBuffer, String> {
    if bytes.is_empty() {
        return Err("empty payload".to_string());
    }

    let decoder = Decoder::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    if channels == 0 || sample_rate == 0 {
        return Err("stream reports no channels or no sample rate".to_string());
    }

    let samples: Vec<f32> = decoder.collect();
    let buffer = DecodedBuffer::new(samples, channels, sample_rate);
    if buffer.is_empty() {
        return Err("payload contains no audio frames".to_string());
    }
    Ok(buffer)
}
