//! The playback state machine.
//!
//! `Controller` is the single owner of the playlist, the engine and the
//! playback state. The player thread feeds it commands and ticks; everything
//! the UI needs is published into the shared [`PlaybackHandle`] afterwards.

use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::config::PlayerSettings;
use crate::playlist::{Playlist, PlaylistStore, Track};

use super::engine::Engine;
use super::types::{PlaybackHandle, PlaybackState, PlayerCmd, Status};

pub struct Controller<E: Engine> {
    engine: E,
    playlist: Playlist,
    store: PlaylistStore,

    index: usize,
    state: PlaybackState,
    volume: f32,
    repeat: bool,

    elapsed: Duration,
    duration: Option<Duration>,

    info: PlaybackHandle,
    tracks_dirty: bool,
    status: Sender<Status>,
}

impl<E: Engine> Controller<E> {
    pub fn new(
        mut engine: E,
        tracks: Vec<Track>,
        store: PlaylistStore,
        settings: &PlayerSettings,
        info: PlaybackHandle,
        status: Sender<Status>,
    ) -> Self {
        let volume = clamp_volume(settings.volume).unwrap_or(0.5);
        engine.set_volume(volume);

        let mut playlist = Playlist::from_tracks(tracks);
        if settings.shuffle {
            playlist.set_shuffle(true, 0);
        }

        let mut controller = Self {
            engine,
            playlist,
            store,
            index: 0,
            state: PlaybackState::Stopped,
            volume,
            repeat: settings.repeat,
            elapsed: Duration::ZERO,
            duration: None,
            info,
            tracks_dirty: true,
            status,
        };
        controller.publish();
        controller
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[cfg(test)]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[cfg(test)]
    pub fn repeat(&self) -> bool {
        self.repeat
    }

    #[cfg(test)]
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    #[cfg(test)]
    pub(super) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Apply one command. Returns `false` once the controller has shut down.
    pub fn handle(&mut self, cmd: PlayerCmd) -> bool {
        match cmd {
            PlayerCmd::PlayAt(i) => self.play_at(i),
            PlayerCmd::TogglePause => self.toggle_play_pause(),
            PlayerCmd::Next => self.next(),
            PlayerCmd::Prev => self.previous(),
            PlayerCmd::SeekBy(secs) => self.seek_by(secs),
            PlayerCmd::SetVolume(v) => self.set_volume(v),
            PlayerCmd::AdjustVolume(delta) => self.set_volume(self.volume + delta),
            PlayerCmd::SetShuffle(on) => self.set_shuffle(on),
            PlayerCmd::SetRepeat(on) => self.set_repeat(on),
            PlayerCmd::Add(tracks) => self.add(tracks),
            PlayerCmd::Clear => self.clear(),
            PlayerCmd::Save => self.save(),
            PlayerCmd::Reload => self.reload(),
            PlayerCmd::Quit => {
                self.stop();
                self.publish();
                return false;
            }
        }
        self.publish();
        true
    }

    /// Periodic work: end-of-track detection and progress sampling.
    pub fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if self.engine.finished() {
            self.on_track_end();
        } else {
            self.elapsed = self.engine.elapsed();
        }
        self.publish();
    }

    pub fn play_at(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index).cloned() else {
            tracing::warn!(index, len = self.playlist.len(), "play_at out of range");
            return;
        };

        self.index = index;
        self.elapsed = Duration::ZERO;
        self.duration = None;

        match self.engine.load(&track.path) {
            Ok(duration) => {
                self.duration = duration;
                self.state = PlaybackState::Playing;
                tracing::info!(index, title = %track.title, "now playing");
                self.report(Status::success(format!("Now playing: {}", track.title)));
            }
            Err(e) => {
                self.engine.stop();
                self.state = PlaybackState::Stopped;
                tracing::warn!(index, error = %e, "playback failed");
                self.report(Status::error(format!("Error playing track: {e}")));
            }
        }
    }

    pub fn toggle_play_pause(&mut self) {
        match self.state {
            PlaybackState::Stopped => {
                if !self.playlist.is_empty() {
                    self.play_at(self.index);
                }
            }
            PlaybackState::Playing => {
                self.engine.pause();
                self.elapsed = self.engine.elapsed();
                self.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                self.engine.resume();
                self.state = PlaybackState::Playing;
            }
        }
    }

    pub fn next(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        let target = if self.index + 1 < self.playlist.len() {
            self.index + 1
        } else if self.repeat {
            0
        } else {
            return;
        };
        self.play_at(target);
    }

    pub fn previous(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        let target = if self.index > 0 {
            self.index - 1
        } else if self.repeat {
            self.playlist.len() - 1
        } else {
            return;
        };
        self.play_at(target);
    }

    pub fn seek_by(&mut self, secs: i64) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        let target = seek_target(self.engine.elapsed(), secs, self.duration);
        match self.engine.seek(target) {
            Ok(()) => self.elapsed = target,
            Err(e) => {
                tracing::warn!(error = %e, "seek failed");
                self.report(Status::error(e.to_string()));
            }
        }
    }

    /// Clamp to `[0, 1]` and apply immediately. NaN is ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if let Some(v) = clamp_volume(volume) {
            self.volume = v;
            self.engine.set_volume(v);
        }
    }

    pub fn set_shuffle(&mut self, on: bool) {
        if on == self.playlist.is_shuffled() {
            return;
        }
        self.index = self.playlist.set_shuffle(on, self.index);
        self.tracks_dirty = true;
        self.report(Status::success(if on {
            "Shuffle enabled"
        } else {
            "Shuffle disabled"
        }));
    }

    pub fn set_repeat(&mut self, on: bool) {
        self.repeat = on;
        self.report(Status::success(if on {
            "Repeat enabled"
        } else {
            "Repeat disabled"
        }));
    }

    pub fn add(&mut self, tracks: Vec<Track>) {
        let msg = match tracks.as_slice() {
            [] => return,
            [one] => format!("Added: {}", one.title),
            many => format!("Added {} tracks", many.len()),
        };
        self.playlist.add_many(tracks);
        self.tracks_dirty = true;
        self.report(Status::success(msg));
    }

    pub fn clear(&mut self) {
        self.stop();
        self.playlist.clear();
        self.index = 0;
        self.tracks_dirty = true;
        self.report(Status::success("Playlist cleared"));
    }

    pub fn save(&mut self) {
        match self.store.save(&self.playlist) {
            Ok(()) => self.report(Status::success("Playlist saved!")),
            Err(e) => {
                tracing::error!(error = %e, "saving playlist failed");
                self.report(Status::error(e.to_string()));
            }
        }
    }

    /// Replace the playlist with the stored one. On a hard failure the
    /// current playlist is kept.
    pub fn reload(&mut self) {
        match self.store.load_with_policy() {
            Ok((tracks, recovered)) => {
                self.stop();
                let shuffle = self.playlist.is_shuffled();
                self.playlist = Playlist::from_tracks(tracks);
                if shuffle {
                    self.playlist.set_shuffle(true, 0);
                }
                self.index = 0;
                self.tracks_dirty = true;
                match recovered {
                    Some(e) => self.report(Status::error(e.to_string())),
                    None => self.report(Status::success(format!(
                        "Playlist loaded ({} tracks)",
                        self.playlist.len()
                    ))),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "reloading playlist failed");
                self.report(Status::error(e.to_string()));
            }
        }
    }

    fn on_track_end(&mut self) {
        if self.repeat || self.index + 1 < self.playlist.len() {
            self.next();
        } else {
            tracing::debug!(index = self.index, "end of playlist");
            self.stop();
        }
    }

    fn stop(&mut self) {
        self.engine.stop();
        self.state = PlaybackState::Stopped;
        self.elapsed = Duration::ZERO;
        self.duration = None;
    }

    fn report(&self, status: Status) {
        let _ = self.status.send(status);
    }

    fn publish(&mut self) {
        let Ok(mut info) = self.info.lock() else {
            return;
        };
        if self.tracks_dirty {
            info.tracks = self.playlist.active().cloned().collect();
            self.tracks_dirty = false;
        }
        info.index = self.index;
        info.state = self.state;
        info.elapsed = self.elapsed;
        info.duration = self.duration;
        info.fraction = progress_fraction(self.elapsed, self.duration);
        info.volume = self.volume;
        info.shuffle = self.playlist.is_shuffled();
        info.repeat = self.repeat;
    }
}

pub(crate) fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

pub(crate) fn progress_fraction(elapsed: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(d) if !d.is_zero() => (elapsed.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

pub(crate) fn seek_target(elapsed: Duration, secs: i64, duration: Option<Duration>) -> Duration {
    let target = if secs >= 0 {
        elapsed.saturating_add(Duration::from_secs(secs.unsigned_abs()))
    } else {
        elapsed.saturating_sub(Duration::from_secs(secs.unsigned_abs()))
    };
    match duration {
        Some(d) => target.min(d),
        None => target,
    }
}
