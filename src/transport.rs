//! The playback controller.
//!
//! `Controller` is an explicit state machine over `TransportState`; its
//! public methods are the only way transport state changes. Everything it
//! knows about audio goes through the `AudioEngine` trait, so the whole
//! module is exercised in tests against a scripted engine.

mod controller;
mod observer;
mod state;

pub use controller::Controller;
pub use observer::{PlaybackObserver, PositionUpdate};
pub use state::{ControllerOptions, EndOfTrack, PlaybackSession, Snapshot, TransportState};
