//! Application model: the catalog listing, the cursor and the latest
//! transport snapshot the UI renders from.
//!
//! `App` never drives audio itself. The runtime feeds it controller
//! snapshots and observer updates; key handlers read it to decide which
//! track to hand to the controller.

use crate::library::{Track, TrackId};
use crate::transport::{PositionUpdate, Snapshot, TransportState};

/// Number of peak buckets computed for tracks without catalog waveform data.
pub const WAVEFORM_BUCKETS: usize = 512;

pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    /// Index into `tracks` of the controller's current track.
    pub now_playing: Option<usize>,
    pub snapshot: Snapshot,
    /// Latest playhead in seconds; refreshed by the observer while playing.
    pub position: f64,
    pub metadata_window: bool,
    /// Where the catalog came from, for the status line.
    pub catalog_label: Option<String>,
    /// Catalog failure or other message not owned by the controller.
    pub notice: Option<String>,
    computed_waveform: Option<(TrackId, Vec<f32>)>,
}

impl App {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            selected: 0,
            now_playing: None,
            snapshot: Snapshot::default(),
            position: 0.0,
            metadata_window: false,
            catalog_label: None,
            notice: None,
            computed_waveform: None,
        }
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    pub fn now_playing_track(&self) -> Option<&Track> {
        self.now_playing.and_then(|i| self.tracks.get(i))
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn set_catalog_label(&mut self, label: String) {
        self.catalog_label = Some(label);
    }

    pub fn set_selected(&mut self, idx: usize) {
        if idx < self.tracks.len() {
            self.selected = idx;
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if let Some(i) = self.step_from(self.selected, 1) {
            self.selected = i;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if let Some(i) = self.step_from(self.selected, -1) {
            self.selected = i;
        }
    }

    /// Catalog neighbour of the current track (or of the cursor when
    /// nothing is current), wrapping at both ends.
    pub fn neighbour_track(&self, step: isize) -> Option<usize> {
        self.step_from(self.now_playing.unwrap_or(self.selected), step)
    }

    fn step_from(&self, from: usize, step: isize) -> Option<usize> {
        let len = self.tracks.len() as isize;
        if len == 0 {
            return None;
        }
        Some((from as isize + step).rem_euclid(len) as usize)
    }

    /// Adopt a fresh controller snapshot. Returns whether anything an
    /// external observer would care about (track, state, loop, volume)
    /// changed.
    pub fn sync(&mut self, snapshot: Snapshot) -> bool {
        let changed = snapshot.track_id != self.snapshot.track_id
            || snapshot.state != self.snapshot.state
            || snapshot.is_looping != self.snapshot.is_looping
            || snapshot.volume != self.snapshot.volume;

        if snapshot.track_id != self.snapshot.track_id {
            self.now_playing = snapshot
                .track_id
                .and_then(|id| self.tracks.iter().position(|t| t.id == id));
        }
        if snapshot.state != TransportState::Playing {
            self.position = snapshot.current_offset;
        }
        self.snapshot = snapshot;
        changed
    }

    pub fn apply_position(&mut self, update: PositionUpdate) {
        self.position = update.offset;
    }

    /// Fraction of the current track already played, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.snapshot.duration > 0.0 {
            (self.position / self.snapshot.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Remember peaks computed from a decoded buffer. Ignored for tracks
    /// whose catalog entry already carries waveform data.
    pub fn set_computed_waveform(&mut self, id: TrackId, peaks: Vec<f32>) {
        self.computed_waveform = Some((id, peaks));
    }

    pub fn needs_computed_waveform(&self, id: TrackId) -> bool {
        let from_catalog = self
            .tracks
            .iter()
            .find(|t| t.id == id)
            .is_some_and(|t| t.waveform.as_ref().is_some_and(|w| !w.is_empty()));
        !from_catalog && self.computed_waveform.as_ref().is_none_or(|(c, _)| *c != id)
    }

    /// Waveform of the current track: catalog data first, computed peaks
    /// otherwise.
    pub fn waveform(&self) -> Option<&[f32]> {
        let track = self.now_playing_track()?;
        if let Some(w) = track.waveform.as_deref().filter(|w| !w.is_empty()) {
            return Some(w);
        }
        match &self.computed_waveform {
            Some((id, peaks)) if *id == track.id => Some(peaks),
            _ => None,
        }
    }

    /// One-line state summary for the status box.
    pub fn status_line(&self) -> String {
        let s = &self.snapshot;
        let mut parts: Vec<String> = Vec::new();

        let state = match s.state {
            TransportState::Empty => "Idle",
            TransportState::Loading => "Loading",
            TransportState::Paused => "Paused",
            TransportState::Playing => "Playing",
        };
        parts.push(state.to_string());

        if let Some(t) = self.now_playing_track() {
            parts.push(format!("Track: {}", t.display));
        }
        parts.push(format!("Loop: {}", if s.is_looping { "ON" } else { "OFF" }));
        parts.push(format!("Vol: {:.0}%", s.volume * 100.0));

        if let Some(label) = &self.catalog_label {
            parts.push(format!("Catalog: {label}"));
        }
        if let Some(err) = s.error.as_ref().or(self.notice.as_ref()) {
            parts.push(format!("Error: {err}"));
        }

        parts.join(" • ")
    }
}
