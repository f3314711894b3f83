use std::time::{Duration, Instant};

use crate::audio::AudioEngine;

use super::controller::Controller;

const MIN_HZ: u32 = 10;
const MAX_HZ: u32 = 60;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionUpdate {
    pub offset: f64,
    pub duration: f64,
    pub looping: bool,
}

/// Rate-limited view of the playhead for the UI.
///
/// `poll` yields at most one update per interval while the controller is
/// playing, restarts immediately whenever a new session begins, and yields
/// nothing at all otherwise. It only ever reads the controller.
#[derive(Debug)]
pub struct PlaybackObserver {
    interval: Duration,
    last: Option<(u64, Instant)>,
}

impl PlaybackObserver {
    pub fn new(refresh_hz: u32) -> Self {
        let hz = refresh_hz.clamp(MIN_HZ, MAX_HZ);
        Self {
            interval: Duration::from_secs(1) / hz,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn poll<E: AudioEngine>(
        &mut self,
        controller: &Controller<E>,
        now: Instant,
    ) -> Option<PositionUpdate> {
        let Some(session) = controller.session().filter(|_| controller.is_playing()) else {
            self.last = None;
            return None;
        };

        if let Some((serial, at)) = self.last {
            if serial == session.serial && now.saturating_duration_since(at) < self.interval {
                return None;
            }
        }

        self.last = Some((session.serial, now));
        Some(PositionUpdate {
            offset: controller.position(),
            duration: controller.duration(),
            looping: session.looping,
        })
    }
}
