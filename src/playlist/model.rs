use std::path::PathBuf;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A playable unit: a title and the local file it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub path: PathBuf,
}

impl Track {
    pub fn new(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }
}

/// Ordered tracks in insertion order plus the order used for navigation.
///
/// `order[active_pos]` is a position in `tracks`, so the active (possibly
/// shuffled) view is a permutation of the insertion order and every active
/// slot maps back to exactly one inserted track.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    order: Vec<usize>,
    shuffled: bool,
}

impl Playlist {
    /// Build a playlist in insertion order from already-acquired tracks.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let order = (0..tracks.len()).collect();
        Self {
            tracks,
            order,
            shuffled: false,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Track at `index` in the active order.
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.order.get(index).map(|&i| &self.tracks[i])
    }

    /// Tracks in the active (navigation) order.
    pub fn active(&self) -> impl Iterator<Item = &Track> {
        self.order.iter().map(|&i| &self.tracks[i])
    }

    /// Tracks in insertion order; this is what gets persisted.
    pub fn original(&self) -> &[Track] {
        &self.tracks
    }

    /// Append to the end of both orders.
    pub fn add(&mut self, track: Track) {
        self.order.push(self.tracks.len());
        self.tracks.push(track);
    }

    pub fn add_many(&mut self, tracks: impl IntoIterator<Item = Track>) {
        for track in tracks {
            self.add(track);
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.order.clear();
    }

    /// Switch shuffle on or off using the thread RNG.
    ///
    /// Returns the active position of the slot that was at `current`.
    pub fn set_shuffle(&mut self, on: bool, current: usize) -> usize {
        self.set_shuffle_with(on, current, &mut rand::rng())
    }

    /// Same as [`Playlist::set_shuffle`] with a caller-provided RNG.
    pub fn set_shuffle_with<R: Rng + ?Sized>(&mut self, on: bool, current: usize, rng: &mut R) -> usize {
        if on == self.shuffled {
            return current;
        }
        let anchor = self.order.get(current).copied();
        self.shuffled = on;

        if on {
            self.order.shuffle(rng);
        } else {
            self.order = (0..self.tracks.len()).collect();
        }

        anchor
            .and_then(|slot| self.order.iter().position(|&i| i == slot))
            .unwrap_or(0)
    }
}
