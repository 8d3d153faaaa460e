use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::config::AcquireSettings;
use crate::error::AcquireError;
use crate::playlist::Track;

use super::download::download;
use super::input::Input;
use super::local::import;
use super::probe::probe;

/// Outcome of one acquisition, delivered back to the shell.
#[derive(Debug)]
pub struct AcquireEvent {
    /// What the user typed.
    pub request: String,
    pub result: Result<Vec<Track>, AcquireError>,
}

/// Turns URLs, searches and local paths into playable tracks.
#[derive(Debug, Clone)]
pub struct Acquirer {
    settings: AcquireSettings,
    downloads_dir: PathBuf,
}

impl Acquirer {
    pub fn new(settings: AcquireSettings, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            downloads_dir: downloads_dir.into(),
        }
    }

    /// Probe the transcoder; returns the binary that answered.
    pub fn check_transcoder(&self) -> Result<String, AcquireError> {
        probe(
            &self.settings.transcoder,
            "-version",
            Duration::from_secs(self.settings.probe_timeout_secs),
        )
    }

    /// Classify `raw` against the configured search source.
    pub fn classify(&self, raw: &str) -> Option<Input> {
        Input::classify(raw, self.settings.search_source)
    }

    /// Blocking acquisition. The transcoder probe runs first so a missing
    /// dependency fails before anything is downloaded or imported.
    pub fn acquire(&self, input: &Input) -> Result<Vec<Track>, AcquireError> {
        let transcoder = self.check_transcoder()?;

        match input {
            Input::Local(path) => import(path, &self.settings),
            Input::Url(target) | Input::Search(target) => {
                download(target, &self.downloads_dir, &transcoder, &self.settings)
                    .map(|track| vec![track])
            }
        }
    }

    /// Run [`Acquirer::acquire`] on a worker thread and report on `tx`.
    pub fn spawn(&self, request: String, input: Input, tx: Sender<AcquireEvent>) {
        let acquirer = self.clone();
        thread::spawn(move || {
            let result = acquirer.acquire(&input);
            match &result {
                Err(e) if e.is_missing_dependency() => {
                    tracing::info!(%request, error = %e, "acquisition skipped");
                }
                Err(e) => tracing::warn!(%request, error = %e, "acquisition failed"),
                Ok(tracks) => tracing::debug!(%request, count = tracks.len(), "acquisition done"),
            }
            let _ = tx.send(AcquireEvent { request, result });
        });
    }
}
