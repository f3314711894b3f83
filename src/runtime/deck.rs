//! Glue between the app model and the transport: turns user intents into
//! controller calls and feeds the results back into `App`.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::app::{App, WAVEFORM_BUCKETS};
use crate::audio::{AudioEngine, Loader};
use crate::mpris::ControlCmd;
use crate::transport::{Controller, PlaybackObserver};

/// Upper bound on how long the event loop waits for input.
const MAX_IDLE: Duration = Duration::from_millis(50);

pub struct Deck<E: AudioEngine> {
    pub controller: Controller<E>,
    loader: Loader,
    observer: PlaybackObserver,
    autoplay: bool,
    compute_waveforms: bool,
}

impl<E: AudioEngine> Deck<E> {
    pub fn new(
        controller: Controller<E>,
        loader: Loader,
        observer: PlaybackObserver,
        autoplay: bool,
        compute_waveforms: bool,
    ) -> Self {
        Self {
            controller,
            loader,
            observer,
            autoplay,
            compute_waveforms,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.observer.interval().min(MAX_IDLE)
    }

    /// Make `app.tracks[idx]` current and start fetching it.
    pub fn load_index(&mut self, app: &mut App, idx: usize, play: bool) {
        let Some(track) = app.tracks.get(idx).cloned() else {
            return;
        };
        app.set_selected(idx);
        let ticket = self.controller.select_track(track.clone());
        self.loader.request(ticket, track);
        if play {
            self.controller.play();
        }
    }

    /// Enter on the cursor: load it, or just play it if it is already the
    /// current track.
    pub fn activate_selected(&mut self, app: &mut App) {
        let Some(track) = app.selected_track() else {
            return;
        };
        let already_current = self.controller.current_track().is_some_and(|t| t.id == track.id);
        if already_current {
            self.controller.play();
        } else {
            let idx = app.selected;
            self.load_index(app, idx, self.autoplay);
        }
    }

    pub fn step_track(&mut self, app: &mut App, step: isize) {
        if let Some(idx) = app.neighbour_track(step) {
            self.load_index(app, idx, self.autoplay);
        }
    }

    /// Apply a command from the keyboard or MPRIS. Returns `true` for quit;
    /// the caller owns the shutdown sequence.
    pub fn handle_control(&mut self, app: &mut App, cmd: ControlCmd) -> bool {
        debug!(?cmd, "control command");
        let cursor = app.selected;
        match cmd {
            ControlCmd::Quit => return true,
            ControlCmd::Play => {
                if self.controller.current_track().is_none() {
                    self.load_index(app, cursor, true);
                } else {
                    self.controller.play();
                }
            }
            ControlCmd::Pause => self.controller.pause(),
            ControlCmd::PlayPause => {
                if self.controller.current_track().is_none() {
                    self.load_index(app, cursor, true);
                } else {
                    self.controller.toggle_play_pause();
                }
            }
            ControlCmd::Stop => {
                self.controller.pause();
                self.controller.seek(0.0);
            }
            ControlCmd::Next => self.step_track(app, 1),
            ControlCmd::Prev => self.step_track(app, -1),
            ControlCmd::SetLoop(on) => self.controller.set_loop(on),
            ControlCmd::SetVolume(v) => self.controller.set_volume(v),
        }
        false
    }

    /// Commit finished loads, apply engine notifications and refresh the
    /// app model. Returns whether externally visible state changed.
    pub fn tick(&mut self, app: &mut App, now: Instant) -> bool {
        while let Some(outcome) = self.loader.try_recv() {
            let committed = self.controller.finish_load(outcome.ticket, outcome.result);
            debug!(ticket = outcome.ticket.0, track = outcome.track_id, committed, "load outcome");
        }
        self.controller.pump_engine();

        let changed = app.sync(self.controller.snapshot());
        if let Some(update) = self.observer.poll(&self.controller, now) {
            app.apply_position(update);
        }

        if self.compute_waveforms {
            if let (Some(id), Some(buffer)) = (app.snapshot.track_id, self.controller.buffer()) {
                if app.needs_computed_waveform(id) {
                    app.set_computed_waveform(id, buffer.peaks(WAVEFORM_BUCKETS));
                }
            }
        }
        changed
    }
}
