//! The audio-output seam and its `rodio` implementation.
//!
//! An engine holds at most one loaded track. The controller drives it and
//! polls `finished` for the end-of-track signal.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::PlaybackError;

pub trait Engine {
    /// Open, decode and start playing `path`, replacing whatever was loaded.
    ///
    /// Returns the total duration when it can be determined.
    fn load(&mut self, path: &Path) -> Result<Option<Duration>, PlaybackError>;
    fn pause(&mut self);
    fn resume(&mut self);
    /// Unload the current track.
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn seek(&mut self, pos: Duration) -> Result<(), PlaybackError>;
    /// Playback position of the loaded track.
    fn elapsed(&self) -> Duration;
    /// True once a loaded, unpaused track has run out of samples.
    fn finished(&self) -> bool;
}

/// Engine backed by the default output device.
pub struct RodioEngine {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioEngine {
    /// Open the default output device. A missing device is not fatal: every
    /// `load` then fails with [`PlaybackError::NoDevice`].
    pub fn open(volume: f32) -> Self {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped, which
                // would scribble over the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                tracing::error!(error = %e, "no audio output device");
                None
            }
        };
        Self {
            stream,
            sink: None,
            volume,
        }
    }

    pub fn has_device(&self) -> bool {
        self.stream.is_some()
    }
}

impl Engine for RodioEngine {
    fn load(&mut self, path: &Path) -> Result<Option<Duration>, PlaybackError> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(PlaybackError::NoDevice("output stream unavailable".to_string()));
        };

        let file = File::open(path).map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Many mp3 streams carry no length; ask the container instead.
        let duration = source.total_duration().or_else(|| probe_duration(path));

        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.play();
        self.sink = Some(sink);
        Ok(duration)
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.play();
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }

    fn seek(&mut self, pos: Duration) -> Result<(), PlaybackError> {
        match self.sink.as_ref() {
            Some(s) => s.try_seek(pos).map_err(|e| PlaybackError::Seek(e.to_string())),
            None => Ok(()),
        }
    }

    fn elapsed(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !s.is_paused() && s.empty())
    }
}

fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
