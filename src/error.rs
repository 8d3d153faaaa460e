//! Error types shared by the playlist store, the playback controller and
//! track acquisition.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures turning a URL, search term or local path into tracks.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// A required external tool is not on the execution path.
    #[error("{tool} not found")]
    MissingDependency { tool: String },

    /// The extractor exited unsuccessfully or produced unusable output.
    #[error("Download error: {0}")]
    Download(String),

    /// The extractor reported a transcoding problem.
    #[error("Transcoding error: {0}")]
    Transcode(String),

    /// A subprocess ran past its deadline and was killed.
    #[error("{tool} timed out after {}s", .after.as_secs())]
    TimedOut { tool: String, after: Duration },

    /// A local path exists but holds nothing playable.
    #[error("No audio files found at {}", .0.display())]
    NoAudio(PathBuf),

    /// A local file with an extension the player does not handle.
    #[error("Unsupported file: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, AcquireError::MissingDependency { .. })
    }
}

/// Failures opening or driving a track in the audio engine.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("No audio output device: {0}")]
    NoDevice(String),

    #[error("Cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Seek failed: {0}")]
    Seek(String),
}

/// Failures reading or writing the playlist file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Cannot read playlist {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write playlist {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed playlist {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
