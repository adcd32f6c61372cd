mod app;
mod components;
mod composer;
mod draw;
mod keys;
mod state;
mod ui;
mod views;
mod web;

#[cfg(test)]
mod test_support;

use crate::app::App;
use crate::state::app_settings::{AppSettings, CliCommand, Mode};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::RotationTimer;
use anyhow::Context;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tracing_subscriber::EnvFilter;
use trophy_api::Snapshot;
use trophy_api::source::load_snapshot;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = match handle_cli_args() {
        Some(settings) => settings,
        None => return Ok(()),
    };

    better_panic::install();

    match settings.mode {
        Mode::Serve => {
            let default_filter = if settings.debug { "debug" } else { "info" };
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
                .init();

            let snapshot = initial_snapshot(&settings).await?;
            web::serve(&settings, snapshot).await
        }
        Mode::Tui => {
            tui_logger::init_logger(log::LevelFilter::Info)?;
            tui_logger::set_default_level(log::LevelFilter::Info);

            // loaded before the terminal is taken over so a failure prints normally
            let snapshot = initial_snapshot(&settings).await?;
            run_kiosk(settings, snapshot).await
        }
    }
}

/// A board without data is useless, so the first load is fatal on failure.
async fn initial_snapshot(settings: &AppSettings) -> anyhow::Result<Snapshot> {
    let options = settings.load_options();
    info!("loading snapshot from {}", options.source);
    let snapshot = load_snapshot(&options)
        .await
        .with_context(|| format!("initial snapshot load from {} failed", options.source))?;
    info!(
        "snapshot ready: {} teams, {} matches, {} scorers",
        snapshot.teams.len(),
        snapshot.matches.len(),
        snapshot.players.len()
    );
    Ok(snapshot)
}

fn handle_cli_args() -> Option<AppSettings> {
    match AppSettings::load() {
        Ok(CliCommand::Run(settings)) => Some(*settings),
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            None
        }
        Ok(CliCommand::Version) => {
            println!("trophyboard {}", env!("CARGO_PKG_VERSION"));
            None
        }
        Err(e) => {
            eprintln!("{e}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "trophyboard - rotating tournament board: bracket, schedule and top scorers

Usage:
  trophyboard [serve] [--host HOST] [--port PORT] [--interval SECS] [--views LIST] [--paused] [--snapshot FILE] [--debug]
  trophyboard tui [--interval SECS] [--views LIST] [--paused] [--snapshot FILE] [--debug]
  trophyboard --help
  trophyboard --version

Environment (a .env file is read first):
  TROPHY_HOST, TROPHY_PORT       Bind address for serve (default 0.0.0.0:8060)
  TROPHY_DEBUG                   Debug logging (default false)
  TROPHY_ROTATION_SECS           Seconds per view (default 30)
  TROPHY_AUTO_ROTATE             Rotate on start (default true)
  TROPHY_VIEWS                   Rotation order (default tree,schedule,scorers)
  TROPHY_TOP_SCORERS             Leaderboard size (default 14)
  TROPHY_ASSETS_DIR              Static files served under /assets (default assets)
  TROPHY_SNAPSHOT_JSON           Local snapshot file instead of BigQuery
  TROPHY_LAYOUT_JSON             Tournament layout override
  TROPHY_GCP_PROJECT, TROPHY_GCP_DATASET
  GCP_CREDENTIALS_JSON, GCP_CREDENTIALS_BASE64, GOOGLE_APPLICATION_CREDENTIALS
                                 Service account key, tried in this order, then ./service_account.json

Kiosk keys:
  space/p  pause or resume rotation     1-9    jump to a tab
  r        reload snapshot              f      full screen
  \"        log pane                     q      quit"
}

// ---------------------------------------------------------------------------
// Terminal kiosk
// ---------------------------------------------------------------------------

async fn run_kiosk(settings: AppSettings, snapshot: Snapshot) -> anyhow::Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    let rotation_interval = settings.rotation_interval;
    let load_options = settings.load_options();
    let mut app = App::new(settings);
    app.on_snapshot_loaded(snapshot);
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Snapshot loader thread
    let network_worker = NetworkWorker::new(load_options, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Rotation timer thread
    let rotation_timer = RotationTimer::new(rotation_interval, ui_event_tx.clone());
    let rotation_task = tokio::spawn(rotation_timer.run());

    // First draw
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    rotation_task.abort();

    Ok(())
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted | UiEvent::Resize => true,
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::RotationTick(n_intervals) => app.lock().await.on_rotation_tick(n_intervals),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
        }
        NetworkResponse::SnapshotLoaded { snapshot } => {
            let mut guard = app.lock().await;
            guard.on_snapshot_loaded(*snapshot);
        }
        NetworkResponse::Error { message } => {
            error!("Snapshot reload failed: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    true
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide).unwrap();
    execute!(stdout, terminal::EnterAlternateScreen).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    terminal::enable_raw_mode().unwrap();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0)).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    execute!(stdout, terminal::LeaveAlternateScreen).unwrap();
    execute!(stdout, cursor::Show).unwrap();
    terminal::disable_raw_mode().unwrap();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
