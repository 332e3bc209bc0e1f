//! Terminal client for the form generation service.
//! Run: cargo run -p formgen-tui  (or `-- --verify` for a one-shot connectivity check).

mod app;
mod form_widget;
mod logging;
mod ui;

use app::App;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use formgen_client::HttpFormService;
use formgen_core::{ClientConfig, Completion, FormController, FormService};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Pre-flight check: load config and probe the generation service once.
async fn run_verify() -> Result<(), String> {
    let config = ClientConfig::load().map_err(|e| format!("Config load failed: {}", e))?;
    let service = HttpFormService::from_config(&config).map_err(|e| e.to_string())?;
    print!("Checking {}/test... ", service.base_url());
    service
        .ping()
        .await
        .map_err(|e| format!("{} unreachable: {}", config.base_url, e.message()))?;
    println!("OK");
    Ok(())
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Forwards terminal events from a blocking reader thread.
fn spawn_input_reader(tx: mpsc::Sender<Event>) {
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.blocking_send(ev).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(target: "formgen::tui", error = %e, "Terminal input failed");
                break;
            }
        }
    });
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: App,
    mut completions: mpsc::Receiver<Completion>,
    mut activity: broadcast::Receiver<String>,
) -> Result<(), BoxError> {
    let (input_tx, mut input_rx) = mpsc::channel(64);
    spawn_input_reader(input_tx);
    app.start();

    loop {
        let mut form = app.controller.render_with(&mut app.form);
        while form.changed {
            form = app.controller.render_with(&mut app.form);
        }
        terminal.draw(|f| ui::draw(f, &app, &form))?;
        if app.should_quit {
            return Ok(());
        }

        let deadline = app.controller.next_expiry();
        tokio::select! {
            ev = input_rx.recv() => app.handle_event(ev),
            Some(completion) = completions.recv() => app.on_completion(completion),
            Ok(line) = activity.recv() => app.push_activity(line),
            _ = wait_until(deadline) => {
                app.controller.expire_notices(Instant::now());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[formgen-tui] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify().await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    let config = ClientConfig::load()?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    let (activity_tx, activity_rx) = broadcast::channel(256);
    logging::init(log_file, activity_tx);
    tracing::info!(target: "formgen::tui", base_url = %config.base_url, "{} starting", config.app_name);

    let service: Arc<dyn FormService> = Arc::new(HttpFormService::from_config(&config)?);
    let controller = FormController::new(service, config.notice_ttl());
    let (completion_tx, completion_rx) = mpsc::channel(16);
    let app = App::new(config.app_name.clone(), controller, completion_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run(&mut terminal, app, completion_rx, activity_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    if let Err(e) = &result {
        tracing::error!(target: "formgen::tui", error = %e, "Terminal client stopped");
    }
    result
}
