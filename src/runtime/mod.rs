use std::env;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::audio::{Loader, RodioEngine, SourceFetcher};
use crate::mpris::ControlCmd;
use crate::transport::{Controller, ControllerOptions, PlaybackObserver};

mod deck;
mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.log)?;

    let target = env::args().nth(1).unwrap_or_else(|| ".".to_string());
    info!(%target, "starting");

    let mut app = startup::build_app(&target, &settings);

    // Opened once for the whole process; a missing device is fatal before
    // the terminal is taken over.
    let engine = RodioEngine::open(settings.audio.initial_volume)?;
    let controller = Controller::new(
        engine,
        ControllerOptions::from(&settings.playback),
        settings.audio.initial_volume,
    );
    let loader = Loader::new(SourceFetcher::new(&settings.audio)?);
    let observer = PlaybackObserver::new(settings.ui.refresh_hz);
    let mut deck = deck::Deck::new(
        controller,
        loader,
        observer,
        settings.playback.autoplay_on_select,
        settings.ui.show_waveform,
    );

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    mpris_sync::update_mpris(&mpris, &app);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut deck,
        &mpris,
        &control_tx,
        &control_rx,
    );

    deck.controller
        .engine_mut()
        .fade_out(Duration::from_millis(settings.audio.quit_fade_out_ms));
    deck.controller.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("bye");
    run_result
}
