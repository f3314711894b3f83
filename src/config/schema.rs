use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/sampledeck/config.toml` or `~/.config/sampledeck/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SAMPLEDECK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub catalog: CatalogSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Gain applied at startup, `0.0..=1.0`.
    pub initial_volume: f32,
    /// Volume change per `+` / `-` key press.
    pub volume_step: f32,
    /// Optional connect timeout for fetching remote tracks (milliseconds).
    /// Transfers themselves are never timed out.
    pub http_connect_timeout_ms: Option<u64>,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            volume_step: 0.05,
            http_connect_timeout_ms: None,
            quit_fade_out_ms: 150,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Start each track with the catalog's loop flag.
    pub apply_loop_default: bool,
    /// Where the playhead rests after a non-looping track ends.
    pub end_of_track: EndOfTrackSetting,
    /// Start playback as soon as a selected track finishes loading.
    pub autoplay_on_select: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            apply_loop_default: true,
            end_of_track: EndOfTrackSetting::Rewind,
            autoplay_on_select: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndOfTrackSetting {
    #[serde(alias = "rewind-to-start", alias = "start")]
    Rewind,
    #[serde(alias = "stay", alias = "end", alias = "remain-at-end")]
    Hold,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to seek when pressing `H` / `L`.
    pub seek_seconds: f64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { seek_seconds: 1.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How often the playhead position is refreshed while playing.
    pub refresh_hz: u32,
    /// Draw the waveform strip under the transport line.
    pub show_waveform: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ sampledeck ~ ".to_string(),
            refresh_hz: 30,
            show_waveform: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogSource {
    Auto,
    #[serde(alias = "toml")]
    Manifest,
    #[serde(alias = "dir", alias = "scan")]
    Directory,
    #[serde(alias = "directus", alias = "http")]
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Which catalog backend to use.
    pub source: CatalogSource,
    /// Base URL of the remote metadata service.
    pub remote_base_url: String,
    /// File extensions to treat as audio when scanning (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            source: CatalogSource::Auto,
            remote_base_url: "http://localhost:8055".to_string(),
            extensions: vec!["wav".into(), "flac".into(), "mp3".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Write logs to this file. Without it logs are discarded, since the
    /// terminal belongs to the UI.
    pub file: Option<std::path::PathBuf>,
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}
