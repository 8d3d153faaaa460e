use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::acquire::{AcquireEvent, Acquirer, remediation};
use crate::app::App;
use crate::audio::{AudioPlayer, PlayerCmd, Status};
use crate::config;
use crate::error::AcquireError;
use crate::ui;

/// Channels the shell reads from (status, finished acquisitions) and hands
/// to acquisition workers.
pub struct Channels<'a> {
    pub status_rx: &'a Receiver<Status>,
    pub acquire_tx: &'a Sender<AcquireEvent>,
    pub acquire_rx: &'a Receiver<AcquireEvent>,
}

/// Main terminal event loop: handles input, UI drawing and the messages
/// coming back from the player thread and acquisition workers. Returns
/// `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    acquirer: &Acquirer,
    channels: &Channels<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(status) = channels.status_rx.try_recv() {
            app.set_status(status);
        }

        while let Ok(done) = channels.acquire_rx.try_recv() {
            app.pending = app.pending.saturating_sub(1);
            match done.result {
                Ok(tracks) => {
                    app.clear_instructions();
                    let _ = audio_player.send(PlayerCmd::Add(tracks));
                }
                Err(e) => report_acquire_error(app, &e),
            }
        }

        app.sync_selection();
        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.player))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, acquirer, channels) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Show an acquisition failure; a missing tool also gets install steps.
pub(super) fn report_acquire_error(app: &mut App, err: &AcquireError) {
    app.set_status(Status::error(err.to_string()));
    if let AcquireError::MissingDependency { tool } = err {
        app.set_instructions(remediation(tool, std::env::consts::OS));
    }
}

fn submit_input(app: &mut App, acquirer: &Acquirer, tx: &Sender<AcquireEvent>) {
    let Some(raw) = app.take_input() else {
        return;
    };
    let Some(input) = acquirer.classify(&raw) else {
        return;
    };

    tracing::info!(request = %raw, ?input, "acquisition requested");
    app.pending += 1;
    app.set_status(Status::success(format!("Adding: {raw}")));
    acquirer.spawn(raw, input, tx.clone());
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    acquirer: &Acquirer,
    channels: &Channels<'_>,
) -> bool {
    if app.is_adding() {
        match key.code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Enter => submit_input(app, acquirer, channels.acquire_tx),
            KeyCode::Backspace => app.pop_input_char(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.push_input_char(c);
            }
            _ => {}
        }
        return false;
    }

    let send = |cmd: PlayerCmd| {
        let _ = audio_player.send(cmd);
    };

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('a') => app.enter_input_mode(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if !app.snapshot().tracks.is_empty() {
                app.follow_playback_on();
                send(PlayerCmd::PlayAt(app.selected));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback_on();
            send(PlayerCmd::TogglePause);
        }
        KeyCode::Char('l') => {
            app.follow_playback_on();
            send(PlayerCmd::Next);
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            send(PlayerCmd::Prev);
        }
        KeyCode::Char('L') => {
            let secs = settings.player.seek_seconds.min(i64::MAX as u64) as i64;
            send(PlayerCmd::SeekBy(secs));
        }
        KeyCode::Char('H') => {
            let secs = settings.player.seek_seconds.min(i64::MAX as u64) as i64;
            send(PlayerCmd::SeekBy(-secs));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            send(PlayerCmd::AdjustVolume(settings.player.volume_step));
        }
        KeyCode::Char('-') => send(PlayerCmd::AdjustVolume(-settings.player.volume_step)),
        KeyCode::Char('s') => {
            app.follow_playback_on();
            send(PlayerCmd::SetShuffle(!app.snapshot().shuffle));
        }
        KeyCode::Char('r') => send(PlayerCmd::SetRepeat(!app.snapshot().repeat)),
        KeyCode::Char('w') => send(PlayerCmd::Save),
        KeyCode::Char('o') => {
            app.follow_playback_on();
            send(PlayerCmd::Reload);
        }
        KeyCode::Char('c') => send(PlayerCmd::Clear),
        _ => {}
    }

    false
}
