//! Extractor invocation and download file naming.
//!
//! The extractor writes into a staging file inside the downloads directory
//! and prints the extracted title and the final file path; the staged file
//! is then moved to `<sanitised title>.<ext>`, suffixed ` (2)`, ` (3)`, ...
//! when that name is taken.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::AcquireSettings;
use crate::error::AcquireError;
use crate::playlist::Track;

use super::process::run_with_timeout;

const MAX_STEM_CHARS: usize = 150;

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Download `target` into `downloads_dir` and return the resulting track.
pub(crate) fn download(
    target: &str,
    downloads_dir: &Path,
    transcoder: &str,
    settings: &AcquireSettings,
) -> Result<Track, AcquireError> {
    fs::create_dir_all(downloads_dir)?;

    let stem = format!(
        ".staging-{}-{}",
        std::process::id(),
        STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    let template = downloads_dir.join(format!("{stem}.%(ext)s"));

    let mut cmd = Command::new(&settings.downloader);
    cmd.args(extractor_args(settings, transcoder, template.into_os_string()))
        .arg(target);

    tracing::info!(input = %target, downloader = %settings.downloader, "download started");
    let result = run_with_timeout(
        cmd,
        &settings.downloader,
        Duration::from_secs(settings.timeout_secs),
    )
    .and_then(|out| {
        if out.status.success() {
            let stdout = String::from_utf8_lossy(&out.stdout);
            parse_print_output(&stdout).ok_or_else(|| {
                AcquireError::Download(format!(
                    "{} did not report a title and file",
                    settings.downloader
                ))
            })
        } else {
            Err(classify_failure(&String::from_utf8_lossy(&out.stderr), out.status.code()))
        }
    })
    .and_then(|(title, staged)| {
        if !staged.is_file() {
            return Err(AcquireError::Download(format!(
                "{} reported {} but no file exists",
                settings.downloader,
                staged.display()
            )));
        }
        let ext = staged
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(settings.audio_format.as_str())
            .to_string();
        let dest = claim_unique_path(downloads_dir, &sanitize_title(&title), &ext)?;
        if let Err(e) = fs::rename(&staged, &dest) {
            let _ = fs::remove_file(&dest);
            return Err(e.into());
        }
        Ok(Track::new(title, dest))
    });

    match &result {
        Ok(track) => {
            tracing::info!(title = %track.title, path = %track.path.display(), "download complete");
        }
        Err(e) => {
            tracing::warn!(input = %target, error = %e, "download failed");
            remove_staged(downloads_dir, &stem);
        }
    }
    result
}

fn extractor_args(settings: &AcquireSettings, transcoder: &str, template: OsString) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "--no-playlist",
        "--format",
        "bestaudio/best",
        "--extract-audio",
        "--audio-format",
        settings.audio_format.as_str(),
        "--audio-quality",
        settings.audio_quality.as_str(),
        "--no-simulate",
        "--quiet",
        "--no-warnings",
        "--print",
        "after_move:title",
        "--print",
        "after_move:filepath",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();

    // An explicit location only matters when the transcoder is not found by name.
    if transcoder.contains(['/', '\\']) {
        args.push("--ffmpeg-location".into());
        args.push(transcoder.into());
    }
    args.push("--output".into());
    args.push(template);
    args
}

/// Extract `(title, filepath)` from the two trailing `--print` lines.
pub(crate) fn parse_print_output(stdout: &str) -> Option<(String, PathBuf)> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect();
    match lines.as_slice() {
        [.., title, path] => Some((title.trim().to_string(), PathBuf::from(path.trim()))),
        _ => None,
    }
}

pub(crate) fn classify_failure(stderr: &str, code: Option<i32>) -> AcquireError {
    let message = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| match code {
            Some(c) => format!("exit status {c}"),
            None => "terminated by signal".to_string(),
        });

    let lower = stderr.to_ascii_lowercase();
    if lower.contains("ffmpeg") || lower.contains("ffprobe") || lower.contains("postprocessing") {
        AcquireError::Transcode(message)
    } else {
        AcquireError::Download(message)
    }
}

/// Make an extracted title safe to use as a file stem.
pub(crate) fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_STEM_CHARS)
        .collect();
    let cleaned = cleaned.trim().trim_end_matches('.').trim_start_matches('.').trim();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Create the first free `<stem>.<ext>`, `<stem> (2).<ext>`, ... inside
/// `dir` and return its path.
///
/// The name is reserved with `create_new`, so concurrent downloads of the
/// same title never end up sharing a file; the caller renames over the
/// empty placeholder.
pub(crate) fn claim_unique_path(dir: &Path, stem: &str, ext: &str) -> io::Result<PathBuf> {
    let names = std::iter::once(format!("{stem}.{ext}"))
        .chain((2u32..).map(|n| format!("{stem} ({n}).{ext}")));
    for name in names {
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free file name for {stem}.{ext}"),
    ))
}

/// Remove the files belonging to one staging stem, `<stem>.<ext>` and
/// yt-dlp's `<stem>.<ext>.part` style leftovers.
pub(crate) fn remove_staged(dir: &Path, stem: &str) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let prefix = format!("{stem}.");
    for entry in entries.filter_map(Result::ok) {
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            let _ = fs::remove_file(entry.path());
        }
    }
}
