//! Runtime dependency probing and install instructions.

use std::process::Command;
use std::time::Duration;

use crate::error::AcquireError;

use super::process::run_with_timeout;

/// Binaries to try for a configured tool name. The bare default also tries
/// the Windows executable name.
pub fn candidates(configured: &str) -> Vec<String> {
    let configured = configured.trim();
    if configured.ends_with(".exe") || configured.contains(['/', '\\']) {
        vec![configured.to_string()]
    } else {
        vec![configured.to_string(), format!("{configured}.exe")]
    }
}

/// Return the first candidate that runs `<candidate> <version_flag>` successfully.
pub fn probe(
    tool: &str,
    version_flag: &str,
    timeout: Duration,
) -> Result<String, AcquireError> {
    for candidate in candidates(tool) {
        let mut cmd = Command::new(&candidate);
        cmd.arg(version_flag);
        match run_with_timeout(cmd, &candidate, timeout) {
            Ok(out) if out.status.success() => {
                tracing::debug!(tool = %candidate, "dependency found");
                return Ok(candidate);
            }
            Ok(out) => {
                tracing::debug!(tool = %candidate, status = ?out.status.code(), "dependency probe failed");
            }
            Err(e) => {
                tracing::debug!(tool = %candidate, error = %e, "dependency probe failed");
            }
        }
    }
    Err(AcquireError::MissingDependency {
        tool: tool.to_string(),
    })
}

/// Install instructions for `tool` on the operating system family `os`
/// (as in [`std::env::consts::OS`]).
pub fn remediation(tool: &str, os: &str) -> String {
    let is_ffmpeg = tool.to_ascii_lowercase().contains("ffmpeg");
    match (os, is_ffmpeg) {
        ("windows", true) => format!(
            "{tool} is not installed. Please follow these steps:\n\
             1. Download FFmpeg from: https://github.com/BtbN/FFmpeg-Builds/releases\n\
             2. Download the 'ffmpeg-master-latest-win64-gpl.zip'\n\
             3. Extract the zip file to a location like 'C:\\ffmpeg'\n\
             4. Add the bin folder (e.g. 'C:\\ffmpeg\\bin') to your PATH:\n   \
                System Properties > Advanced > Environment Variables > Path > Edit > New\n\
             5. Restart this application"
        ),
        ("macos", true) => format!(
            "{tool} is not installed. Please follow these steps:\n\
             1. Install Homebrew if you haven't already: https://brew.sh\n\
             2. Install FFmpeg using Homebrew: brew install ffmpeg\n\
             3. Restart this application"
        ),
        (_, true) => format!(
            "{tool} is not installed. Please follow these steps:\n\
             1. Open a terminal\n\
             2. Run: sudo apt-get update\n\
             3. Run: sudo apt-get install ffmpeg\n\
             4. Restart this application"
        ),
        ("windows", false) => format!(
            "{tool} is not installed. Download yt-dlp.exe from \
             https://github.com/yt-dlp/yt-dlp/releases, put it in a folder on your PATH \
             and restart this application"
        ),
        ("macos", false) => format!(
            "{tool} is not installed. Install it with Homebrew: brew install yt-dlp"
        ),
        (_, false) => format!(
            "{tool} is not installed. Install it with: python3 -m pip install --user -U yt-dlp"
        ),
    }
}
