use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use super::download::{
    claim_unique_path, classify_failure, parse_print_output, remove_staged, sanitize_title,
};
use super::local::{import, is_audio_file};
use super::probe::{candidates, remediation};
use super::*;
use crate::config::{AcquireSettings, SearchSource};
use crate::error::AcquireError;

fn acquirer_with(dir: &Path, settings: AcquireSettings) -> Acquirer {
    Acquirer::new(settings, dir.join("downloads"))
}

#[test]
fn classify_blank_input_is_none() {
    assert_eq!(Input::classify("", SearchSource::Youtube), None);
    assert_eq!(Input::classify("   ", SearchSource::Youtube), None);
}

#[test]
fn classify_recognises_urls_and_extractor_prefixes() {
    assert_eq!(
        Input::classify(" https://example.com/watch?v=1 ", SearchSource::Youtube),
        Some(Input::Url("https://example.com/watch?v=1".to_string()))
    );
    assert_eq!(
        Input::classify("HTTP://example.com/a", SearchSource::Youtube),
        Some(Input::Url("HTTP://example.com/a".to_string()))
    );
    assert_eq!(
        Input::classify("ytsearch5:lofi", SearchSource::Soundcloud),
        Some(Input::Url("ytsearch5:lofi".to_string()))
    );
    for raw in ["bilisearch:foo", "scsearchall:foo", "ytsearchdate10:foo", "nicosearch3:bar"] {
        assert_eq!(
            Input::classify(raw, SearchSource::Youtube),
            Some(Input::Url(raw.to_string())),
            "{raw}"
        );
    }
}

#[test]
fn classify_does_not_treat_ordinary_colons_as_extractor_prefixes() {
    for raw in ["artist: song", "search:foo", "ytsearch foo: bar", "research notes"] {
        assert_eq!(
            Input::classify(raw, SearchSource::Youtube),
            Some(Input::Search(format!("ytsearch1:{raw}"))),
            "{raw}"
        );
    }
}

#[test]
fn classify_wraps_free_text_in_the_configured_search() {
    assert_eq!(
        Input::classify("daft punk around the world", SearchSource::Youtube),
        Some(Input::Search("ytsearch1:daft punk around the world".to_string()))
    );
    assert_eq!(
        Input::classify("daft punk", SearchSource::Soundcloud),
        Some(Input::Search("scsearch1:daft punk".to_string()))
    );
}

#[test]
fn classify_existing_path_is_local() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("song.mp3");
    fs::write(&file, b"x").unwrap();

    let raw = file.to_string_lossy().to_string();
    let input = Input::classify(&raw, SearchSource::Youtube).unwrap();
    assert_eq!(input, Input::Local(file));
}

#[test]
fn candidates_add_windows_name_only_for_bare_names() {
    assert_eq!(candidates("ffmpeg"), vec!["ffmpeg", "ffmpeg.exe"]);
    assert_eq!(candidates("ffmpeg.exe"), vec!["ffmpeg.exe"]);
    assert_eq!(candidates("/opt/bin/ffmpeg"), vec!["/opt/bin/ffmpeg"]);
}

#[test]
fn remediation_has_one_branch_per_platform_family() {
    let win = remediation("ffmpeg", "windows");
    assert!(win.contains("PATH"));
    assert!(win.contains("bin"));

    let mac = remediation("ffmpeg", "macos");
    assert!(mac.contains("brew install ffmpeg"));

    let linux = remediation("ffmpeg", "linux");
    assert!(linux.contains("apt-get install ffmpeg"));

    assert!(remediation("yt-dlp", "linux").contains("yt-dlp"));
    assert_ne!(remediation("yt-dlp", "macos"), remediation("yt-dlp", "linux"));
}

#[test]
fn missing_transcoder_fails_before_any_work() {
    let dir = tempdir().unwrap();
    let settings = AcquireSettings {
        transcoder: "cassette-no-such-transcoder".to_string(),
        ..AcquireSettings::default()
    };
    let acquirer = acquirer_with(dir.path(), settings);

    let input = acquirer.classify("some search").unwrap();
    let err = acquirer.acquire(&input).unwrap_err();
    assert!(err.is_missing_dependency(), "got {err:?}");
    assert!(!dir.path().join("downloads").exists());
}

#[test]
fn missing_transcoder_also_blocks_local_imports() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("song.mp3");
    fs::write(&file, b"x").unwrap();

    let settings = AcquireSettings {
        transcoder: "cassette-no-such-transcoder".to_string(),
        ..AcquireSettings::default()
    };
    let acquirer = acquirer_with(dir.path(), settings);
    let err = acquirer.acquire(&Input::Local(file)).unwrap_err();
    assert!(matches!(err, AcquireError::MissingDependency { ref tool } if tool == "cassette-no-such-transcoder"));
}

#[test]
fn spawn_delivers_failures_as_events() {
    let dir = tempdir().unwrap();
    let settings = AcquireSettings {
        transcoder: "cassette-no-such-transcoder".to_string(),
        ..AcquireSettings::default()
    };
    let acquirer = acquirer_with(dir.path(), settings);
    let (tx, rx) = std::sync::mpsc::channel();

    let input = acquirer.classify("anything").unwrap();
    acquirer.spawn("anything".to_string(), input, tx);

    let event = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(event.request, "anything");
    assert!(event.result.unwrap_err().is_missing_dependency());
}

#[cfg(unix)]
#[test]
fn probe_accepts_a_tool_that_exits_successfully() {
    let dir = tempdir().unwrap();
    let settings = AcquireSettings {
        transcoder: "true".to_string(),
        ..AcquireSettings::default()
    };
    assert_eq!(acquirer_with(dir.path(), settings).check_transcoder().unwrap(), "true");
}

#[cfg(unix)]
#[test]
fn probe_rejects_a_tool_that_fails() {
    let dir = tempdir().unwrap();
    let settings = AcquireSettings {
        transcoder: "false".to_string(),
        ..AcquireSettings::default()
    };
    let err = acquirer_with(dir.path(), settings).check_transcoder().unwrap_err();
    assert!(err.is_missing_dependency());
}

#[cfg(unix)]
#[test]
fn subprocess_past_its_deadline_is_killed() {
    let mut cmd = std::process::Command::new("sleep");
    cmd.arg("5");
    let started = std::time::Instant::now();
    let err = super::process::run_with_timeout(cmd, "sleep", Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, AcquireError::TimedOut { .. }), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn sanitize_title_replaces_illegal_characters() {
    assert_eq!(sanitize_title("AC/DC: Back in Black?"), "AC_DC_ Back in Black_");
    assert_eq!(sanitize_title("a\\b*c\"d<e>f|g"), "a_b_c_d_e_f_g");
    assert_eq!(sanitize_title("tab\there"), "tab_here");
    assert_eq!(sanitize_title("   "), "untitled");
    assert_eq!(sanitize_title(".."), "untitled");
    assert_eq!(sanitize_title("  Song  "), "Song");
}

#[test]
fn sanitize_title_caps_length() {
    let long = "x".repeat(400);
    assert_eq!(sanitize_title(&long).chars().count(), 150);
}

#[test]
fn claim_unique_path_appends_an_index_on_collision() {
    let dir = tempdir().unwrap();
    let first = claim_unique_path(dir.path(), "Song", "mp3").unwrap();
    assert_eq!(first, dir.path().join("Song.mp3"));
    assert!(first.is_file());

    let second = claim_unique_path(dir.path(), "Song", "mp3").unwrap();
    assert_eq!(second, dir.path().join("Song (2).mp3"));

    fs::write(dir.path().join("Song (3).mp3"), b"3").unwrap();
    let fourth = claim_unique_path(dir.path(), "Song", "mp3").unwrap();
    assert_eq!(fourth, dir.path().join("Song (4).mp3"));
    assert_eq!(fs::read(dir.path().join("Song (3).mp3")).unwrap(), b"3");
}

#[test]
fn concurrent_claims_of_one_title_get_distinct_files() {
    let dir = tempdir().unwrap();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dir = dir.path().to_path_buf();
            std::thread::spawn(move || claim_unique_path(&dir, "Song", "mp3").unwrap())
        })
        .collect();

    let mut paths: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 8);
}

#[test]
fn remove_staged_only_touches_its_own_stem() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".staging-42-1.webm"), b"mine").unwrap();
    fs::write(dir.path().join(".staging-42-1.webm.part"), b"mine").unwrap();
    fs::write(dir.path().join(".staging-42-10.webm"), b"other").unwrap();
    fs::write(dir.path().join(".staging-42-12.mp3"), b"other").unwrap();

    remove_staged(dir.path(), ".staging-42-1");

    assert!(!dir.path().join(".staging-42-1.webm").exists());
    assert!(!dir.path().join(".staging-42-1.webm.part").exists());
    assert!(dir.path().join(".staging-42-10.webm").exists());
    assert!(dir.path().join(".staging-42-12.mp3").exists());
}

#[test]
fn parse_print_output_takes_the_last_two_lines() {
    let out = "[download] something\nMy Song\n/tmp/dl/.staging-1-0.mp3\n\n";
    let (title, path) = parse_print_output(out).unwrap();
    assert_eq!(title, "My Song");
    assert_eq!(path, Path::new("/tmp/dl/.staging-1-0.mp3"));

    assert!(parse_print_output("only one line\n").is_none());
    assert!(parse_print_output("").is_none());
}

#[test]
fn failures_mentioning_the_transcoder_are_transcode_errors() {
    let err = classify_failure("ERROR: Postprocessing: ffprobe and ffmpeg not found\n", Some(1));
    match err {
        AcquireError::Transcode(msg) => assert_eq!(msg, "Postprocessing: ffprobe and ffmpeg not found"),
        other => panic!("unexpected {other:?}"),
    }

    let err = classify_failure("WARNING: x\nERROR: [youtube] abc: Video unavailable\n", Some(1));
    match err {
        AcquireError::Download(msg) => assert_eq!(msg, "[youtube] abc: Video unavailable"),
        other => panic!("unexpected {other:?}"),
    }

    assert!(matches!(classify_failure("", Some(2)), AcquireError::Download(m) if m == "exit status 2"));
}

#[test]
fn is_audio_file_matches_configured_extensions_case_insensitive() {
    let settings = AcquireSettings::default();
    assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
}

#[test]
fn import_directory_filters_and_sorts_by_title() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"hidden").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("c.wav"), b"not a real wav").unwrap();

    let tracks = import(dir.path(), &AcquireSettings::default()).unwrap();
    let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "b", "c"]);
    assert_eq!(tracks[2].path, sub.join("c.wav"));
}

#[test]
fn import_single_file_uses_the_file_itself() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("Intro.flac");
    fs::write(&file, b"not real").unwrap();

    let tracks = import(&file, &AcquireSettings::default()).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "Intro");
    assert_eq!(tracks[0].path, file);
}

#[test]
fn import_rejects_unsupported_files_and_empty_directories() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, b"text").unwrap();

    assert!(matches!(
        import(&file, &AcquireSettings::default()),
        Err(AcquireError::Unsupported(p)) if p == file
    ));

    let empty = dir.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    assert!(matches!(
        import(&empty, &AcquireSettings::default()),
        Err(AcquireError::NoAudio(p)) if p == empty
    ));
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
const FAKE_EXTRACTOR: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --output) out="$2"; shift ;;
  esac
  shift
done
file=$(printf '%s' "$out" | sed 's/%(ext)s/mp3/')
printf 'audio' > "$file"
if [ -n "$FAIL" ]; then
  echo "ERROR: [generic] Unsupported URL" >&2
  exit 1
fi
printf 'Fake: Song\n%s\n' "$file"
"#;

#[cfg(unix)]
#[test]
fn download_moves_the_staged_file_to_a_unique_title() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("fake-extractor");
    write_script(&script, FAKE_EXTRACTOR);
    let downloads = dir.path().join("downloads");
    fs::create_dir_all(&downloads).unwrap();
    fs::write(downloads.join("Fake_ Song.mp3"), b"older").unwrap();

    let settings = AcquireSettings {
        downloader: script.to_string_lossy().to_string(),
        transcoder: "true".to_string(),
        ..AcquireSettings::default()
    };
    let acquirer = acquirer_with(dir.path(), settings);

    let tracks = acquirer.acquire(&Input::Url("https://example.com/a".to_string())).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "Fake: Song");
    assert_eq!(tracks[0].path, downloads.join("Fake_ Song (2).mp3"));
    assert_eq!(fs::read(&tracks[0].path).unwrap(), b"audio");

    let leftovers = fs::read_dir(&downloads)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".staging"))
        .count();
    assert_eq!(leftovers, 0);
}

#[cfg(unix)]
#[test]
fn failed_download_removes_staging_files() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("failing-extractor");
    write_script(
        &script,
        &FAKE_EXTRACTOR.replace("if [ -n \"$FAIL\" ]; then", "if true; then"),
    );

    let settings = AcquireSettings {
        downloader: script.to_string_lossy().to_string(),
        transcoder: "true".to_string(),
        ..AcquireSettings::default()
    };
    let acquirer = acquirer_with(dir.path(), settings);

    let err = acquirer.acquire(&Input::Url("https://example.com/b".to_string())).unwrap_err();
    assert!(matches!(err, AcquireError::Download(ref m) if m == "[generic] Unsupported URL"), "got {err:?}");

    let remaining = fs::read_dir(dir.path().join("downloads")).unwrap().count();
    assert_eq!(remaining, 0);
}

#[cfg(unix)]
#[test]
fn missing_downloader_is_a_missing_dependency() {
    let dir = tempdir().unwrap();
    let settings = AcquireSettings {
        downloader: "cassette-no-such-downloader".to_string(),
        transcoder: "true".to_string(),
        ..AcquireSettings::default()
    };
    let acquirer = acquirer_with(dir.path(), settings);
    let err = acquirer.acquire(&Input::Search("ytsearch1:x".to_string())).unwrap_err();
    assert!(matches!(err, AcquireError::MissingDependency { ref tool } if tool == "cassette-no-such-downloader"));
}
