mod config;
mod prefs;
mod state;
mod theme;
mod ui;

use anyhow::Context;
use chrono::Utc;
use config::DashboardConfig;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fleet_core::{fetch_snapshot, snapshot_client, DaemonRecord, SnapshotError};
use futures_util::StreamExt;
use prefs::PreferenceStore;
use ratatui::{backend::CrosstermBackend, Terminal};
use state::App;
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TICK_MS: u64 = 50;

type FetchResult = Result<Vec<DaemonRecord>, SnapshotError>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    init_logging(config.log_stdout);
    info!(api_base = %config.api_base, state_dir = %config.state_dir.display(), "starting fleet dashboard");

    let prefs = PreferenceStore::new(config.preferences_path());
    info!(path = %prefs.path().display(), "theme preferences");
    let client = snapshot_client().context("failed to build http client")?;
    let mut app = App::new(config.clone(), prefs, Utc::now());

    let (fetch_tx, mut fetch_rx) = mpsc::channel::<FetchResult>(1);
    let liveness = app.begin_load();
    let fetch_base = config.api_base.clone();
    let fetch_task = tokio::spawn(async move {
        let result = fetch_snapshot(&client, &fetch_base).await;
        if liveness.is_live() {
            let _ = fetch_tx.send(result).await;
        }
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_MS));

    let outcome = run_loop(&mut terminal, &mut app, &mut events, &mut ticker, &mut fetch_rx).await;

    app.teardown();
    fetch_task.abort();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    outcome
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventStream,
    ticker: &mut tokio::time::Interval,
    fetch_rx: &mut mpsc::Receiver<FetchResult>,
) -> anyhow::Result<()> {
    loop {
        if app.dirty {
            terminal.draw(|frame| ui::render(frame, app))?;
            app.dirty = false;
        }
        if app.should_quit() {
            return Ok(());
        }
        tokio::select! {
            _ = ticker.tick() => {
                app.on_tick(Utc::now());
            }
            Some(result) = fetch_rx.recv() => {
                app.finish_load(result);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key, Utc::now());
                    }
                    Some(Ok(Event::Mouse(mouse))) => app.handle_mouse(mouse),
                    Some(Ok(Event::Resize(_, _))) => app.mark_dirty(),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => return Ok(()),
                }
            }
        }
    }
}

fn init_logging(stdout_enabled: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if stdout_enabled {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}
