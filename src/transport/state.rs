use crate::audio::SourceId;
use crate::config::{EndOfTrackSetting, PlaybackSettings};
use crate::library::TrackId;

/// Logical transport state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    /// No buffer committed.
    #[default]
    Empty,
    /// A track was selected and its buffer is being fetched/decoded.
    Loading,
    Paused,
    Playing,
}

/// Where the playhead rests after a non-looping track plays to its end.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EndOfTrack {
    /// Back to offset 0.
    #[default]
    Rewind,
    /// Stay at the end of the buffer.
    Hold,
}

impl From<EndOfTrackSetting> for EndOfTrack {
    fn from(s: EndOfTrackSetting) -> Self {
        match s {
            EndOfTrackSetting::Rewind => Self::Rewind,
            EndOfTrackSetting::Hold => Self::Hold,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Initialise the loop flag from `Track::loop_default` on every commit.
    pub apply_loop_default: bool,
    pub end_of_track: EndOfTrack,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&PlaybackSettings::default())
    }
}

impl From<&PlaybackSettings> for ControllerOptions {
    fn from(s: &PlaybackSettings) -> Self {
        Self {
            apply_loop_default: s.apply_loop_default,
            end_of_track: s.end_of_track.into(),
        }
    }
}

/// One continuous run of audio output.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaybackSession {
    pub source: SourceId,
    /// Clock time at which offset 0 would have played.
    pub anchor: f64,
    pub looping: bool,
    /// Increments with every new session; lets observers notice rebuilds.
    pub serial: u64,
}

/// Read model handed to the UI.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub state: TransportState,
    pub track_id: Option<TrackId>,
    pub is_loaded: bool,
    pub is_loading: bool,
    pub is_playing: bool,
    pub is_looping: bool,
    /// Seconds into the buffer, within `[0, duration]`.
    pub current_offset: f64,
    pub duration: f64,
    pub volume: f32,
    pub error: Option<String>,
}

/// Map raw elapsed clock time onto the buffer.
///
/// Looping positions wrap modulo the duration; otherwise they clamp to
/// `[0, duration]`. A zero-length buffer always reports 0.
pub fn normalize_position(elapsed: f64, duration: f64, looping: bool) -> f64 {
    if duration.is_nan() || duration <= 0.0 || !elapsed.is_finite() {
        return 0.0;
    }
    if looping {
        elapsed.rem_euclid(duration)
    } else {
        elapsed.clamp(0.0, duration)
    }
}
