//! The audio clock.
//!
//! Time is counted in frames actually pulled by the output mixer, so the
//! clock stands still whenever the device stops asking for audio.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rodio::Source;

/// A monotonic time source in seconds, unrelated to wall-clock time.
pub trait PlaybackClock {
    fn now(&self) -> f64;
}

/// Clock advanced by a silent `ClockTicker` mixed into the output.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    rate: u32,
}

impl FrameClock {
    pub fn new(rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            rate: rate.max(1),
        }
    }

    /// Create the silent source that drives this clock. Exactly one ticker
    /// should be attached to the mixer.
    pub fn ticker(&self) -> ClockTicker {
        ClockTicker {
            frames: self.frames.clone(),
            rate: self.rate,
        }
    }
}

impl PlaybackClock for FrameClock {
    fn now(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.rate as f64
    }
}

/// Infinite mono silence; every sample pulled advances the clock by one frame.
pub struct ClockTicker {
    frames: Arc<AtomicU64>,
    rate: u32,
}

impl Iterator for ClockTicker {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.frames.fetch_add(1, Ordering::Release);
        Some(0.0)
    }
}

impl Source for ClockTicker {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
