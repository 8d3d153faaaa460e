use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cassette/config.toml` or `~/.config/cassette/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CASSETTE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub storage: StorageSettings,
    pub acquire: AcquireSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Initial volume in `[0, 1]`. Volume changes are not written back.
    pub volume: f32,
    /// Interval of the progress / end-of-track tick (milliseconds).
    pub tick_ms: u64,
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Whether repeat starts enabled.
    pub repeat: bool,
    /// Number of seconds to seek when pressing `H` / `L`.
    pub seek_seconds: u64,
    /// Step applied by the `+` / `-` volume keys.
    pub volume_step: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: 0.5,
            tick_ms: 100,
            shuffle: false,
            repeat: false,
            seek_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON file holding the saved playlist.
    pub playlist_path: PathBuf,
    /// Directory downloaded tracks are written to.
    pub downloads_dir: PathBuf,
    /// What to do when the playlist file exists but cannot be parsed.
    pub on_malformed: MalformedPolicy,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            playlist_path: PathBuf::from("playlist.json"),
            downloads_dir: PathBuf::from("downloads"),
            on_malformed: MalformedPolicy::Fail,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    /// Surface the error: startup aborts, a reload keeps the current playlist.
    #[default]
    #[serde(alias = "error")]
    Fail,
    /// Log a warning and continue with an empty playlist.
    #[serde(alias = "start_empty", alias = "empty")]
    StartEmpty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquireSettings {
    /// Extractor binary used for URLs and searches.
    pub downloader: String,
    /// Transcoder binary. Probed with `-version` before every acquisition.
    pub transcoder: String,
    /// Target audio format handed to the extractor.
    pub audio_format: String,
    /// Target audio quality handed to the extractor.
    pub audio_quality: String,
    /// Where bare search terms are looked up.
    pub search_source: SearchSource,
    /// Upper bound for one download + transcode (seconds).
    pub timeout_secs: u64,
    /// Upper bound for a dependency probe (seconds).
    pub probe_timeout_secs: u64,
    /// File extensions imported from local paths (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when importing a directory.
    pub follow_links: bool,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            downloader: "yt-dlp".to_string(),
            transcoder: "ffmpeg".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192K".to_string(),
            search_source: SearchSource::Youtube,
            timeout_secs: 300,
            probe_timeout_secs: 10,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchSource {
    #[default]
    #[serde(alias = "yt")]
    Youtube,
    #[serde(alias = "sc")]
    Soundcloud,
}

impl SearchSource {
    /// Extractor search prefix returning the first hit.
    pub fn prefix(self) -> &'static str {
        match self {
            SearchSource::Youtube => "ytsearch1",
            SearchSource::Soundcloud => "scsearch1",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ cassette ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/cassette/cassette.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
