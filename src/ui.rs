//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::audio::{PlaybackInfo, PlaybackState, Status};
use crate::config::{PlayerSettings, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("a", "add url/search/path");
    map.insert("j/k", "up/down");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next");
    // H/L is filled dynamically from config.
    map.insert("+/-", "volume");
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("w", "save");
    map.insert("o", "load");
    map.insert("c", "clear");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating seek seconds.
fn controls_text(seek_seconds: u64) -> String {
    let order = [
        "a", "j/k", "enter", "space/p", "h/l", "H/L", "+/-", "s", "r", "w", "o", "c", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{}s", seek_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `M:SS`.
pub(crate) fn format_mss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `elapsed / total` label for the progress bar.
pub(crate) fn progress_label(elapsed: Duration, total: Option<Duration>) -> String {
    match total {
        Some(t) => format!("{} / {}", format_mss(elapsed), format_mss(t)),
        None => format_mss(elapsed),
    }
}

fn state_text(info: &PlaybackInfo) -> String {
    let state = match info.state {
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Stopped => "Stopped",
    };
    let mut parts = vec![state.to_string()];
    if let Some(track) = info.current() {
        if info.state != PlaybackState::Stopped {
            parts.push(format!("Song: {}", track.title));
        }
    }
    parts.push(format!("Volume: {:.0}%", info.volume * 100.0));
    parts.push(format!("Shuffle: {}", if info.shuffle { "ON" } else { "OFF" }));
    parts.push(format!("Repeat: {}", if info.repeat { "ON" } else { "OFF" }));
    parts.join(" • ")
}

pub(crate) fn status_color(status: &Status) -> Color {
    if status.is_error() {
        Color::Red
    } else {
        Color::Green
    }
}

/// The progress bar dims while nothing is playing.
pub(crate) fn gauge_color(info: &PlaybackInfo) -> Color {
    if info.is_playing() {
        Color::Green
    } else {
        Color::DarkGray
    }
}

fn left_padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Visible window of `total` rows of height `height` that keeps `selected`
/// centred when possible. Returns `(start, end)`.
pub(crate) fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn draw_tracks(frame: &mut Frame, app: &App, info: &PlaybackInfo, area: Rect) {
    let total = info.tracks.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let selected = app.selected.min(total.saturating_sub(1));
    let (start, end) = visible_window(total, list_height, selected);

    let items: Vec<ListItem> = info.tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let i = start + offset;
            if i == info.index && info.state != PlaybackState::Stopped {
                ListItem::new(format!("♪ {}", track.title)).style(Style::default().fg(Color::Cyan))
            } else {
                ListItem::new(format!("  {}", track.title))
            }
        })
        .collect();

    let title = format!(" playlist ({}) ", total);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, player: &PlayerSettings) {
    let info = app.snapshot();

    let message_height = if app.instructions.is_some() { 9 } else { 3 };
    let input_height = if app.is_adding() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(message_height),
            Constraint::Length(input_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cassette ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let state = Paragraph::new(state_text(&info))
        .block(left_padded(" player "))
        .wrap(Wrap { trim: true });
    frame.render_widget(state, chunks[1]);

    draw_tracks(frame, app, &info, chunks[2]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().fg(gauge_color(&info)))
        .ratio(info.fraction.clamp(0.0, 1.0))
        .label(progress_label(info.elapsed, info.duration));
    frame.render_widget(gauge, chunks[3]);

    // Status line, or install instructions while a dependency is missing.
    let message = match (&app.instructions, &app.status) {
        (Some(text), _) => Paragraph::new(text.as_str()).red(),
        (None, Some(status)) => {
            Paragraph::new(status.text.as_str()).style(Style::default().fg(status_color(status)))
        }
        (None, None) if app.pending > 0 => Paragraph::new("Working...").yellow(),
        (None, None) => Paragraph::new(""),
    };
    let message_title = if app.pending > 0 {
        format!(" status ({} in progress) ", app.pending)
    } else {
        " status ".to_string()
    };
    frame.render_widget(
        message
            .block(left_padded(&message_title))
            .wrap(Wrap { trim: false }),
        chunks[4],
    );

    if app.is_adding() {
        let input = Paragraph::new(format!("{}_", app.input))
            .block(left_padded(" add: url, search or path (enter adds, esc cancels) "));
        frame.render_widget(input, chunks[5]);
    }

    let footer = Paragraph::new(controls_text(player.seek_seconds))
        .block(left_padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[6]);
}
