use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::acquire::{AcquireEvent, Acquirer};
use crate::app::App;
use crate::audio::{AudioPlayer, Status};
use crate::playlist::PlaylistStore;

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();
    if let Some(path) = logging::init(&settings.logging) {
        tracing::info!(log = %path.display(), "cassette starting");
    }
    if let Some(warning) = &config_warning {
        tracing::warn!("{warning}");
    }

    // An explicit argument names the playlist file for this session.
    let playlist_path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.storage.playlist_path.clone());
    let store = PlaylistStore::new(playlist_path, settings.storage.on_malformed);
    let (tracks, load_error) = store.load_with_policy()?;
    tracing::info!(playlist = %store.path().display(), tracks = tracks.len(), "playlist ready");

    let acquirer = Acquirer::new(
        settings.acquire.clone(),
        settings.storage.downloads_dir.clone(),
    );
    let probe = acquirer.check_transcoder();

    let (status_tx, status_rx) = mpsc::channel::<Status>();
    let (acquire_tx, acquire_rx) = mpsc::channel::<AcquireEvent>();

    let audio_player = AudioPlayer::new(tracks, store, settings.player.clone(), status_tx);
    let mut app = App::new(audio_player.playback_handle());

    if let Some(warning) = config_warning {
        app.set_status(Status::error(warning));
    }
    if let Some(e) = load_error {
        app.set_status(Status::error(e.to_string()));
    }
    if let Err(e) = probe {
        event_loop::report_acquire_error(&mut app, &e);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let channels = event_loop::Channels {
            status_rx: &status_rx,
            acquire_tx: &acquire_tx,
            acquire_rx: &acquire_rx,
        };
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &audio_player,
            &acquirer,
            &channels,
        )
    })();

    audio_player.quit();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("cassette exiting");
    run_result
}
