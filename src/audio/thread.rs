use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::PlayerSettings;
use crate::playlist::{PlaylistStore, Track};

use super::controller::Controller;
use super::engine::RodioEngine;
use super::types::{PlaybackHandle, PlayerCmd, Status};

pub(super) fn spawn_player_thread(
    tracks: Vec<Track>,
    store: PlaylistStore,
    rx: Receiver<PlayerCmd>,
    playback_info: PlaybackHandle,
    status: Sender<Status>,
    settings: PlayerSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // The output stream is not `Send`, so the engine is built here.
        let engine = RodioEngine::open(settings.volume);
        if !engine.has_device() {
            let _ = status.send(Status::error("No audio output device"));
        }

        let mut controller =
            Controller::new(engine, tracks, store, &settings, playback_info, status);
        run_loop(&mut controller, &rx, Duration::from_millis(settings.tick_ms.max(1)));
        tracing::debug!("player thread exiting");
    })
}

/// Drive `controller` until `Quit` arrives or every sender is gone.
///
/// Ticks are scheduled against a deadline so a burst of commands cannot
/// starve progress sampling and end-of-track detection.
pub(super) fn run_loop<E: super::engine::Engine>(
    controller: &mut Controller<E>,
    rx: &Receiver<PlayerCmd>,
    tick: Duration,
) {
    let mut next_tick = Instant::now() + tick;
    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match rx.recv_timeout(wait) {
            Ok(cmd) => {
                if !controller.handle(cmd) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                controller.handle(PlayerCmd::Quit);
                break;
            }
        }

        if Instant::now() >= next_tick {
            controller.tick();
            next_tick = Instant::now() + tick;
        }
    }
}
