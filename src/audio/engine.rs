use super::buffer::DecodedBuffer;
use super::types::{EngineEvent, SourceId};

/// The host audio engine as seen by the transport controller.
///
/// Sources are one-shot: once stopped (or ended) a source is gone and a new
/// one has to be created. Every source is connected to the engine's single
/// persistent gain stage when it is created.
pub trait AudioEngine {
    /// Create a source for `buffer`, connected to the gain stage but silent
    /// until `start` is called.
    fn create_source(&mut self, buffer: &DecodedBuffer, looping: bool) -> SourceId;

    /// Begin output of `id` at `offset` seconds into its buffer.
    fn start(&mut self, id: SourceId, offset: f64);

    /// Stop and disconnect `id`. Unknown ids are ignored.
    fn stop(&mut self, id: SourceId);

    /// Write the master gain, `0.0..=1.0`.
    fn set_gain(&mut self, gain: f32);

    /// Current audio-clock time in seconds.
    fn now(&self) -> f64;

    /// Take every event raised since the previous call.
    fn drain_events(&mut self) -> Vec<EngineEvent>;
}
