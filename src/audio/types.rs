//! Audio-related small types and handles.
//!
//! This module defines the commands accepted by the playback thread, the
//! snapshot it publishes for the UI, and the status messages it emits.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::playlist::Track;

/// The playback state of the controller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Start playing the track at the given active index.
    PlayAt(usize),
    /// Stopped -> play current, Playing -> pause, Paused -> resume.
    TogglePause,
    /// Skip to the next track.
    Next,
    /// Go to the previous track.
    Prev,
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    /// Set the volume; clamped to `[0, 1]`.
    SetVolume(f32),
    /// Change the volume by a delta; clamped to `[0, 1]`.
    AdjustVolume(f32),
    SetShuffle(bool),
    SetRepeat(bool),
    /// Append acquired tracks.
    Add(Vec<Track>),
    /// Empty the playlist and stop.
    Clear,
    /// Persist the insertion order to the playlist file.
    Save,
    /// Replace the playlist with the contents of the playlist file.
    Reload,
    /// Stop playback and end the thread.
    Quit,
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Tracks in the active (navigation) order.
    pub tracks: Vec<Track>,
    /// Current index into `tracks`. Meaningful only when `tracks` is non-empty.
    pub index: usize,
    pub state: PlaybackState,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Total duration of the current track, when the decoder knows it.
    pub duration: Option<Duration>,
    /// `elapsed / duration` in `[0, 1]`, 0 when the duration is unknown.
    pub fraction: f64,
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: bool,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            index: 0,
            state: PlaybackState::Stopped,
            elapsed: Duration::ZERO,
            duration: None,
            fraction: 0.0,
            volume: 0.5,
            shuffle: false,
            repeat: false,
        }
    }
}

impl PlaybackInfo {
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    Error,
}

/// A message for the single user-visible status line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub text: String,
}

impl Status {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}
