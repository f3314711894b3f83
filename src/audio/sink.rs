//! Utilities for creating `rodio` sinks from decoded buffers.
//!
//! `BufferSource` plays an in-memory buffer from an arbitrary frame, loops
//! over the whole buffer when asked to, applies the shared gain per sample
//! and reports its natural end over a channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;

use rodio::{OutputStream, Sink, Source};

use super::buffer::DecodedBuffer;
use super::types::{EngineEvent, SourceId};

/// The volume gate: one scalar gain shared by every source for the lifetime
/// of the engine. Stored as `f32` bits so the mixer thread can read it
/// without locking.
#[derive(Debug, Clone)]
pub struct GainGate(Arc<AtomicU32>);

impl GainGate {
    pub fn new(gain: f32) -> Self {
        Self(Arc::new(AtomicU32::new(gain.clamp(0.0, 1.0).to_bits())))
    }

    pub fn set(&self, gain: f32) {
        self.0.store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

pub(super) struct BufferSource {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
    pos: usize,
    looping: bool,
    gain: GainGate,
    on_end: Option<(SourceId, Sender<EngineEvent>)>,
}

impl BufferSource {
    pub(super) fn new(
        buffer: &DecodedBuffer,
        offset: f64,
        looping: bool,
        gain: GainGate,
        on_end: Option<(SourceId, Sender<EngineEvent>)>,
    ) -> Self {
        Self {
            samples: buffer.samples().clone(),
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            pos: buffer.sample_index_at(offset),
            looping,
            gain,
            on_end,
        }
    }

    fn finish(&mut self) {
        if let Some((id, tx)) = self.on_end.take() {
            // The receiver is gone only during shutdown.
            let _ = tx.send(EngineEvent::Ended(id));
        }
    }
}

impl Iterator for BufferSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.samples.len() {
            if !self.looping || self.samples.is_empty() {
                self.finish();
                return None;
            }
            self.pos = 0;
        }

        let sample = self.samples[self.pos];
        self.pos += 1;
        Some(sample * self.gain.get())
    }
}

impl Source for BufferSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Create a paused `Sink` on the stream's mixer. Nothing is appended yet.
pub(super) fn connect_sink(handle: &OutputStream) -> Sink {
    let sink = Sink::connect_new(handle.mixer());
    sink.pause();
    sink
}
