//! JSON persistence for the insertion-order playlist.
//!
//! The file holds a single `tracks` field. It is read entirely on load and
//! overwritten entirely on save.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::MalformedPolicy;
use crate::error::PersistenceError;

use super::model::{Playlist, Track};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlaylistFile {
    tracks: Vec<Track>,
}

/// Handle on the playlist file.
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    path: PathBuf,
    on_malformed: MalformedPolicy,
}

impl PlaylistStore {
    pub fn new(path: impl Into<PathBuf>, on_malformed: MalformedPolicy) -> Self {
        Self {
            path: path.into(),
            on_malformed,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the insertion order of `playlist`, replacing the whole file.
    pub fn save(&self, playlist: &Playlist) -> Result<(), PersistenceError> {
        let file = PlaylistFile {
            tracks: playlist.original().to_vec(),
        };
        let write_err = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| write_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        fs::write(&self.path, json).map_err(write_err)?;

        tracing::info!(path = %self.path.display(), tracks = file.tracks.len(), "playlist saved");
        Ok(())
    }

    /// Read the saved tracks.
    ///
    /// A missing file yields an empty list. Anything else that goes wrong is
    /// an error; see [`PlaylistStore::load_with_policy`] for the lenient form.
    pub fn load(&self) -> Result<Vec<Track>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved playlist");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let file: PlaylistFile =
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), tracks = file.tracks.len(), "playlist loaded");
        Ok(file.tracks)
    }

    /// Like [`PlaylistStore::load`], but applies the configured policy to
    /// unreadable or malformed files.
    ///
    /// With [`MalformedPolicy::StartEmpty`] the error is logged and returned
    /// alongside an empty list so the caller can still report it.
    pub fn load_with_policy(&self) -> Result<(Vec<Track>, Option<PersistenceError>), PersistenceError> {
        match self.load() {
            Ok(tracks) => Ok((tracks, None)),
            Err(e) => match self.on_malformed {
                MalformedPolicy::Fail => Err(e),
                MalformedPolicy::StartEmpty => {
                    tracing::warn!(error = %e, "starting with an empty playlist");
                    Ok((Vec::new(), Some(e)))
                }
            },
        }
    }
}
