//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the cursor, the add box
//! and the status line next to a handle on the published playback state.

mod model;

pub use model::*;
