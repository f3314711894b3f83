use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub type TrackId = u64;

/// Where a track's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Path(PathBuf),
    Url(String),
}

impl SourceLocator {
    /// Interpret `src` as a URL when it has an http(s) scheme, otherwise as a
    /// path resolved against `base`.
    pub fn parse(src: &str, base: Option<&Path>) -> Self {
        let src = src.trim();
        if src.starts_with("http://") || src.starts_with("https://") {
            return Self::Url(src.to_string());
        }

        let path = PathBuf::from(src);
        match base {
            Some(b) if path.is_relative() => Self::Path(b.join(path)),
            _ => Self::Path(path),
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

/// One catalog entry. Immutable once the catalog has produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub author: Option<String>,
    pub source: SourceLocator,
    /// Length claimed by the catalog. A hint for display only; the decoded
    /// buffer decides the real duration.
    pub declared_length: Option<Duration>,
    /// Whether the track should start out looping.
    pub loop_default: bool,
    pub key: Option<String>,
    pub bpm: Option<String>,
    pub waveform: Option<Vec<f32>>,
    pub display: String,
}
