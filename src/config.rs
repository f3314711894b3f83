//! Settings for the deck: schema types and the layered loader.
//!
//! Sources, lowest to highest precedence: struct defaults, the optional
//! `config.toml`, then `SAMPLEDECK__*` environment variables.

mod load;
mod schema;

pub use schema::*;
