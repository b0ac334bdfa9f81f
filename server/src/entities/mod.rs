//! Server-side entity definitions.

pub mod player;

pub use player::{Player, PlayerError};
