//! `RodioEngine`: the production `AudioEngine`.
//!
//! Owns the output stream for the whole process. The stream, the clock
//! ticker and the gain gate are created once in `open` and live until the
//! engine is dropped at shutdown.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info};

use super::buffer::DecodedBuffer;
use super::clock::{FrameClock, PlaybackClock};
use super::engine::AudioEngine;
use super::sink::{BufferSource, GainGate, connect_sink};
use super::types::{EngineError, EngineEvent, SourceId};

const CLOCK_RATE: u32 = 48_000;

struct Slot {
    sink: Sink,
    buffer: DecodedBuffer,
    looping: bool,
}

pub struct RodioEngine {
    stream: OutputStream,
    clock: FrameClock,
    gain: GainGate,
    slots: HashMap<SourceId, Slot>,
    next_id: u64,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
}

impl RodioEngine {
    /// Open the default output device and attach the clock.
    pub fn open(initial_gain: f32) -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Device(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which would land
        // on top of the TUI.
        stream.log_on_drop(false);

        let clock = FrameClock::new(CLOCK_RATE);
        stream.mixer().add(clock.ticker());

        let (events_tx, events_rx) = mpsc::channel();
        info!(rate = CLOCK_RATE, "audio output opened");

        Ok(Self {
            stream,
            clock,
            gain: GainGate::new(initial_gain),
            slots: HashMap::new(),
            next_id: 0,
            events_tx,
            events_rx,
        })
    }

    /// Ramp the gain down and stop everything. Used once on quit.
    pub fn fade_out(&mut self, fade_out: Duration) {
        let ids: Vec<SourceId> = self.slots.keys().copied().collect();
        if !ids.is_empty() && !fade_out.is_zero() {
            let start = self.gain.get();
            let steps: u32 = 20;
            let step = (fade_out / steps).max(Duration::from_millis(1));
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                self.gain.set(start * (1.0 - t));
                thread::sleep(step);
            }
        }
        for id in ids {
            self.stop(id);
        }
    }
}

impl AudioEngine for RodioEngine {
    fn create_source(&mut self, buffer: &DecodedBuffer, looping: bool) -> SourceId {
        self.next_id += 1;
        let id = SourceId(self.next_id);
        let sink = connect_sink(&self.stream);
        self.slots.insert(
            id,
            Slot {
                sink,
                buffer: buffer.clone(),
                looping,
            },
        );
        debug!(source = id.0, looping, "source created");
        id
    }

    fn start(&mut self, id: SourceId, offset: f64) {
        let Some(slot) = self.slots.get(&id) else {
            return;
        };
        let on_end = (!slot.looping).then(|| (id, self.events_tx.clone()));
        let source = BufferSource::new(
            &slot.buffer,
            offset,
            slot.looping,
            self.gain.clone(),
            on_end,
        );
        slot.sink.append(source);
        slot.sink.play();
        debug!(source = id.0, offset, "source started");
    }

    fn stop(&mut self, id: SourceId) {
        if let Some(slot) = self.slots.remove(&id) {
            slot.sink.stop();
            debug!(source = id.0, "source stopped");
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain.set(gain);
    }

    fn now(&self) -> f64 {
        self.clock.now()
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        let events: Vec<EngineEvent> = self.events_rx.try_iter().collect();
        for ev in &events {
            let EngineEvent::Ended(id) = ev;
            self.slots.remove(id);
        }
        events
    }
}
