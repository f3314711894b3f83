use tracing::{debug, info, warn};

use crate::audio::{AudioEngine, DecodedBuffer, EngineEvent, LoadError, LoadTicket};
use crate::library::Track;

use super::state::{
    ControllerOptions, EndOfTrack, PlaybackSession, Snapshot, TransportState, normalize_position,
};

/// Owns transport state and the single active playback session.
///
/// Invariants:
/// - at most one engine source is alive at any time; the old one is always
///   stopped before a new one is created (`rebuild_session`);
/// - `offset` stays within `[0, duration]`;
/// - only the outcome of the most recent `select_track` is ever committed.
///
/// Calls made while a track is loading are buffered: the latest loop flag,
/// play/pause intent and seek target are applied, in that order, once the
/// buffer commits, and dropped if the load fails.
pub struct Controller<E: AudioEngine> {
    engine: E,
    options: ControllerOptions,
    state: TransportState,
    track: Option<Track>,
    buffer: Option<DecodedBuffer>,
    session: Option<PlaybackSession>,
    latest_ticket: Option<LoadTicket>,
    tickets_issued: u64,
    sessions_started: u64,
    /// Authoritative position while paused; last known position otherwise.
    offset: f64,
    looping: bool,
    volume: f32,
    error: Option<String>,
    pending_loop: Option<bool>,
    pending_play: Option<bool>,
    pending_seek: Option<f64>,
}

impl<E: AudioEngine> Controller<E> {
    pub fn new(mut engine: E, options: ControllerOptions, volume: f32) -> Self {
        let volume = clamp_volume(volume);
        engine.set_gain(volume);
        Self {
            engine,
            options,
            state: TransportState::Empty,
            track: None,
            buffer: None,
            session: None,
            latest_ticket: None,
            tickets_issued: 0,
            sessions_started: 0,
            offset: 0.0,
            looping: false,
            volume,
            error: None,
            pending_loop: None,
            pending_play: None,
            pending_seek: None,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn buffer(&self) -> Option<&DecodedBuffer> {
        self.buffer.as_ref()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Duration of the committed buffer, 0 when nothing is loaded.
    pub fn duration(&self) -> f64 {
        self.buffer.as_ref().map_or(0.0, DecodedBuffer::duration_secs)
    }

    /// Current playhead. Recomputed from the clock while playing, the frozen
    /// offset otherwise.
    pub fn position(&self) -> f64 {
        match (self.state, self.session.as_ref()) {
            (TransportState::Playing, Some(s)) => {
                normalize_position(self.engine.now() - s.anchor, self.duration(), s.looping)
            }
            _ => self.offset,
        }
    }

    /// Make `track` the current track and start loading it.
    ///
    /// Any running session stops immediately. The returned ticket must
    /// accompany the load outcome in `finish_load`; every earlier ticket
    /// becomes stale.
    pub fn select_track(&mut self, track: Track) -> LoadTicket {
        self.teardown_session();

        self.tickets_issued += 1;
        let ticket = LoadTicket(self.tickets_issued);
        info!(track = track.id, ticket = ticket.0, title = %track.title, "track selected");

        self.latest_ticket = Some(ticket);
        self.track = Some(track);
        self.buffer = None;
        self.offset = 0.0;
        self.error = None;
        self.pending_loop = None;
        self.pending_play = None;
        self.pending_seek = None;
        self.state = TransportState::Loading;
        ticket
    }

    /// Commit or reject a finished load. Returns `false` when the outcome
    /// belonged to a superseded request and was dropped.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DecodedBuffer, LoadError>,
    ) -> bool {
        if self.latest_ticket != Some(ticket) || self.state != TransportState::Loading {
            debug!(ticket = ticket.0, "discarding stale load outcome");
            return false;
        }

        match result {
            Ok(buffer) => {
                info!(
                    ticket = ticket.0,
                    duration = buffer.duration_secs(),
                    channels = buffer.channels(),
                    rate = buffer.sample_rate(),
                    "track loaded"
                );
                self.buffer = Some(buffer);
                self.offset = 0.0;
                self.state = TransportState::Paused;
                if self.options.apply_loop_default {
                    if let Some(track) = &self.track {
                        self.looping = track.loop_default;
                    }
                }
                // An explicit choice made during the load wins over the
                // catalog default.
                if let Some(looping) = self.pending_loop.take() {
                    self.looping = looping;
                }

                let seek = self.pending_seek.take();
                let play = self.pending_play.take();
                if let Some(t) = seek {
                    self.seek(t);
                }
                if play == Some(true) {
                    self.play();
                }
            }
            Err(e) => {
                warn!(ticket = ticket.0, error = %e, "track failed to load");
                self.error = Some(e.to_string());
                self.track = None;
                self.buffer = None;
                self.offset = 0.0;
                self.pending_loop = None;
                self.pending_play = None;
                self.pending_seek = None;
                self.state = TransportState::Empty;
            }
        }
        true
    }

    pub fn play(&mut self) {
        match self.state {
            TransportState::Empty => debug!("play ignored: nothing loaded"),
            TransportState::Loading => self.pending_play = Some(true),
            TransportState::Playing => {}
            TransportState::Paused => {
                // A playhead parked at the very end starts over.
                let offset = if self.offset >= self.duration() {
                    0.0
                } else {
                    self.offset
                };
                self.offset = offset;
                self.rebuild_session(offset);
                self.state = TransportState::Playing;
            }
        }
    }

    pub fn pause(&mut self) {
        match self.state {
            TransportState::Playing => {
                self.offset = self.position();
                self.teardown_session();
                self.state = TransportState::Paused;
                debug!(offset = self.offset, "paused");
            }
            TransportState::Loading => self.pending_play = Some(false),
            TransportState::Empty | TransportState::Paused => {}
        }
    }

    pub fn toggle_play_pause(&mut self) {
        match self.state {
            TransportState::Playing => self.pause(),
            TransportState::Paused => self.play(),
            TransportState::Loading => {
                self.pending_play = Some(!self.pending_play.unwrap_or(false));
            }
            TransportState::Empty => debug!("toggle ignored: nothing loaded"),
        }
    }

    /// Move the playhead to `t` seconds, clamped to `[0, duration]`.
    pub fn seek(&mut self, t: f64) {
        let t = if t.is_finite() { t } else { 0.0 };
        match self.state {
            TransportState::Empty => debug!("seek ignored: nothing loaded"),
            TransportState::Loading => self.pending_seek = Some(t.max(0.0)),
            TransportState::Paused => self.offset = t.clamp(0.0, self.duration()),
            TransportState::Playing => {
                let t = t.clamp(0.0, self.duration());
                self.offset = t;
                self.rebuild_session(t);
            }
        }
    }

    /// Seek relative to the current playhead.
    pub fn seek_by(&mut self, delta: f64) {
        match self.state {
            TransportState::Paused | TransportState::Playing => {
                let target = self.position() + delta;
                self.seek(target);
            }
            TransportState::Loading => {
                let base = self.pending_seek.unwrap_or(0.0);
                self.seek(base + delta);
            }
            TransportState::Empty => {}
        }
    }

    pub fn set_loop(&mut self, enabled: bool) {
        if self.state == TransportState::Loading {
            self.looping = enabled;
            self.pending_loop = Some(enabled);
            debug!(looping = enabled, "loop flag buffered until load completes");
            return;
        }
        if self.looping == enabled {
            return;
        }
        // Position depends on the running session's loop flag, so read it
        // before the flag changes.
        let offset = self.position();
        self.looping = enabled;
        debug!(looping = enabled, "loop toggled");

        if self.state == TransportState::Playing {
            let offset = normalize_position(offset, self.duration(), enabled);
            self.offset = offset;
            self.rebuild_session(offset);
        }
    }

    pub fn toggle_loop(&mut self) {
        self.set_loop(!self.looping);
    }

    pub fn set_volume(&mut self, v: f32) {
        self.volume = clamp_volume(v);
        self.engine.set_gain(self.volume);
    }

    pub fn nudge_volume(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    /// Apply every notification the engine raised since the last call.
    pub fn pump_engine(&mut self) {
        for ev in self.engine.drain_events() {
            self.handle_engine_event(ev);
        }
    }

    pub fn handle_engine_event(&mut self, ev: EngineEvent) {
        match ev {
            EngineEvent::Ended(id) => {
                let current = self
                    .session
                    .as_ref()
                    .is_some_and(|s| s.source == id && !s.looping);
                if !current || self.state != TransportState::Playing {
                    debug!(source = id.0, "ignoring end of stale source");
                    return;
                }

                self.teardown_session();
                self.offset = match self.options.end_of_track {
                    EndOfTrack::Rewind => 0.0,
                    EndOfTrack::Hold => self.duration(),
                };
                self.state = TransportState::Paused;
                info!(offset = self.offset, "track ended");
            }
        }
    }

    /// Stop output and forget the current track. Volume survives.
    pub fn shutdown(&mut self) {
        self.teardown_session();
        self.track = None;
        self.buffer = None;
        self.latest_ticket = None;
        self.pending_loop = None;
        self.pending_play = None;
        self.pending_seek = None;
        self.offset = 0.0;
        self.state = TransportState::Empty;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            track_id: self.track.as_ref().map(|t| t.id),
            is_loaded: matches!(self.state, TransportState::Paused | TransportState::Playing),
            is_loading: self.state == TransportState::Loading,
            is_playing: self.is_playing(),
            is_looping: self.looping,
            current_offset: self.position(),
            duration: self.duration(),
            volume: self.volume,
            error: self.error.clone(),
        }
    }

    /// Replace the running session with a fresh one starting at `offset`.
    /// The old source is stopped before the new one is created.
    fn rebuild_session(&mut self, offset: f64) {
        self.teardown_session();
        let Some(buffer) = self.buffer.as_ref() else {
            return;
        };

        let source = self.engine.create_source(buffer, self.looping);
        let anchor = self.engine.now() - offset;
        self.engine.start(source, offset);

        self.sessions_started += 1;
        self.session = Some(PlaybackSession {
            source,
            anchor,
            looping: self.looping,
            serial: self.sessions_started,
        });
        debug!(source = source.0, offset, looping = self.looping, "session started");
    }

    fn teardown_session(&mut self) {
        if let Some(s) = self.session.take() {
            self.engine.stop(s.source);
        }
    }
}

fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
