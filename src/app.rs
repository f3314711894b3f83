//! Application state shared by the TUI and the runtime loop.

mod model;

pub use model::*;
