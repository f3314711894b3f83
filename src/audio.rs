//! Audio subsystem: decoding, the audio clock, the engine seam and the
//! background loader.
//!
//! Everything that touches samples or the output device lives here. The
//! transport controller only sees the `AudioEngine` trait and the types
//! re-exported below.

mod buffer;
mod clock;
mod engine;
mod fetch;
mod loader;
mod output;
mod sink;
mod types;

pub use buffer::DecodedBuffer;
pub use engine::AudioEngine;
pub use fetch::{Fetcher, SourceFetcher, decode_bytes};
pub use loader::Loader;
pub use output::RodioEngine;
pub use types::{EngineError, EngineEvent, LoadError, LoadOutcome, LoadTicket, SourceId};

#[cfg(test)]
mod tests;
