use std::path::{Path, PathBuf};

use crate::config::SearchSource;

/// What the user typed into the add box, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Something the extractor can fetch directly.
    Url(String),
    /// An extractor search query such as `ytsearch1:daft punk`.
    Search(String),
    /// A local file or directory.
    Local(PathBuf),
}

impl Input {
    /// Returns `None` for blank input.
    pub fn classify(raw: &str, source: SearchSource) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if is_url(raw) {
            return Some(Input::Url(raw.to_string()));
        }

        let path = expand_home(raw);
        if path.exists() {
            return Some(Input::Local(path));
        }

        Some(Input::Search(format!("{}:{}", source.prefix(), raw)))
    }
}

fn is_url(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || is_search_prefix(&lower)
}

/// yt-dlp search keys: `<extractor>search[N|all|date]:<query>`, e.g.
/// `ytsearch5:`, `scsearch:`, `bilisearchall:`.
fn is_search_prefix(lower: &str) -> bool {
    let Some((key, _)) = lower.split_once(':') else {
        return false;
    };
    if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let key = key.trim_end_matches(|c: char| c.is_ascii_digit());
    let key = key
        .strip_suffix("all")
        .or_else(|| key.strip_suffix("date"))
        .unwrap_or(key);
    key.strip_suffix("search")
        .is_some_and(|extractor| !extractor.is_empty())
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| Path::new(&home).join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}
