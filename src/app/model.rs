//! Application model: selection, the add box and the status line.
//!
//! Playback state itself lives on the player thread; the model only keeps a
//! handle to the published snapshot plus what the shell owns.

use crate::audio::{PlaybackHandle, PlaybackInfo, Status};

/// Whether keys drive the player or edit the add box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Adding,
}

/// The main application model.
pub struct App {
    pub playback_handle: PlaybackHandle,
    pub selected: usize,
    /// Cursor follows the current track until the user moves it.
    pub follow_playback: bool,
    pub input_mode: InputMode,
    pub input: String,
    pub status: Option<Status>,
    /// Remediation text shown while a dependency is missing.
    pub instructions: Option<String>,
    /// Acquisitions still running on worker threads.
    pub pending: usize,
}

impl App {
    pub fn new(playback_handle: PlaybackHandle) -> Self {
        Self {
            playback_handle,
            selected: 0,
            follow_playback: true,
            input_mode: InputMode::Normal,
            input: String::new(),
            status: None,
            instructions: None,
            pending: 0,
        }
    }

    /// Copy of the latest published playback state.
    pub fn snapshot(&self) -> PlaybackInfo {
        self.playback_handle
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    fn track_count(&self) -> usize {
        self.playback_handle
            .lock()
            .map(|info| info.tracks.len())
            .unwrap_or(0)
    }

    /// Keep `selected` inside the playlist and, when following, on the
    /// current track.
    pub fn sync_selection(&mut self) {
        let (len, index) = match self.playback_handle.lock() {
            Ok(info) => (info.tracks.len(), info.index),
            Err(_) => return,
        };
        if len == 0 {
            self.selected = 0;
        } else if self.follow_playback {
            self.selected = index.min(len - 1);
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.track_count();
        if len > 0 {
            self.follow_playback = false;
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.track_count();
        if len > 0 {
            self.follow_playback = false;
            self.selected = if self.selected == 0 {
                len - 1
            } else {
                self.selected - 1
            };
        }
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn enter_input_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.input.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    /// Leave input mode and hand back the trimmed text, `None` when blank.
    pub fn take_input(&mut self) -> Option<String> {
        self.input_mode = InputMode::Normal;
        let text = std::mem::take(&mut self.input);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    pub fn set_instructions(&mut self, text: String) {
        self.instructions = Some(text);
    }

    pub fn clear_instructions(&mut self) {
        self.instructions = None;
    }

    pub fn is_adding(&self) -> bool {
        self.input_mode == InputMode::Adding
    }
}
