use std::path::Path;

use lofty::file::TaggedFileExt;
use lofty::tag::Accessor;
use walkdir::WalkDir;

use crate::config::AcquireSettings;
use crate::error::AcquireError;
use crate::playlist::Track;

pub(crate) fn is_audio_file(path: &Path, settings: &AcquireSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Tag title when there is a non-blank one, otherwise the file stem.
pub(crate) fn track_title(path: &Path) -> String {
    let tagged_title = lofty::read_from_path(path).ok().and_then(|tagged| {
        tagged
            .primary_tag()
            .or_else(|| tagged.first_tag())
            .and_then(|tag| tag.title().map(|t| t.trim().to_string()))
            .filter(|t| !t.is_empty())
    });

    tagged_title.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string()
    })
}

/// Import one file or every audio file below a directory.
pub(crate) fn import(path: &Path, settings: &AcquireSettings) -> Result<Vec<Track>, AcquireError> {
    if path.is_file() {
        if !is_audio_file(path, settings) {
            return Err(AcquireError::Unsupported(path.to_path_buf()));
        }
        return Ok(vec![Track::new(track_title(path), path)]);
    }

    let mut tracks: Vec<Track> = WalkDir::new(path)
        .follow_links(settings.follow_links)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && is_audio_file(e.path(), settings))
        .map(|e| Track::new(track_title(e.path()), e.path()))
        .collect();

    if tracks.is_empty() {
        return Err(AcquireError::NoAudio(path.to_path_buf()));
    }

    tracks.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    tracing::info!(dir = %path.display(), count = tracks.len(), "imported directory");
    Ok(tracks)
}
