//! Playback: the engine seam, the controller state machine and the thread
//! that owns them.

mod controller;
mod engine;
mod player;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::*;
