//! Audio-related small types and handles.
//!
//! Identifiers for engine sources and load requests, the events the engine
//! reports back, and the error types raised at the audio boundary.

use crate::library::TrackId;

use super::buffer::DecodedBuffer;

/// Opaque handle to one buffer source created by an `AudioEngine`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// Notifications raised by the audio engine outside of any caller request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A non-looping source played its last frame.
    Ended(SourceId),
}

/// Generation number attached to every track load.
///
/// Tickets are strictly increasing; only the outcome carrying the most
/// recently issued ticket may be committed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

/// Result of one background load, tagged with the ticket it was issued for.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub track_id: TrackId,
    pub result: Result<DecodedBuffer, LoadError>,
}

/// Failures while turning a track's source locator into a decoded buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The bytes could not be retrieved (I/O, network or HTTP status).
    #[error("failed to fetch {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    /// The bytes were retrieved but are not decodable audio.
    #[error("failed to decode {locator}: {reason}")]
    Decode { locator: String, reason: String },
}

/// Failures opening or driving the output device.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no audio output device: {0}")]
    Device(String),
}
