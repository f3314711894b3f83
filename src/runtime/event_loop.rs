use std::sync::mpsc;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioEngine;
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::deck::Deck;
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// Main terminal event loop: input, drawing, load/engine bookkeeping and
/// MPRIS sync. Returns `Ok(())` once quit is requested; the caller then
/// shuts audio down.
pub fn run<E: AudioEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    deck: &mut Deck<E>,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if deck.tick(app, Instant::now()) {
            update_mpris(mpris, app);
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if deck.handle_control(app, cmd) {
                return Ok(());
            }
        }

        if event::poll(deck.poll_interval())? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, deck, control_tx) {
                    return Ok(());
                }
            }
        }
    }
}

/// Returns `true` when the key asks to quit.
fn handle_key_event<E: AudioEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    deck: &mut Deck<E>,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> bool {
    let seek = settings.controls.seek_seconds;
    let step = settings.audio.volume_step;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => deck.activate_selected(app),
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') | KeyCode::Right => deck.controller.seek_by(seek),
        KeyCode::Char('H') | KeyCode::Left => deck.controller.seek_by(-seek),
        KeyCode::Char('0') => deck.controller.seek(0.0),
        KeyCode::Char('r') => deck.controller.toggle_loop(),
        KeyCode::Char('+') | KeyCode::Char('=') => deck.controller.nudge_volume(step),
        KeyCode::Char('-') => deck.controller.nudge_volume(-step),
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => {}
    }
    false
}
