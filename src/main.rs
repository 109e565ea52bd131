use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatbox::app::App;
use chatbox::config::Config;
use chatbox::tui::{self, EventHandler, Tui};
use chatbox::{handler, ui};

#[derive(Parser)]
#[command(name = "chatbox")]
#[command(about = "Terminal chat client for a rate-limited assistant backend")]
struct Cli {
    /// Backend base URL; messages are posted to <BASE_URL>/chat
    #[arg(long)]
    base_url: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the effective configuration and exit
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.request_timeout_secs = timeout;
    }

    if cli.save_config {
        config.save_to(&config_path)?;
        println!("Saved configuration to {}", config_path.display());
        return Ok(());
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging();
    tracing::info!(base_url = %config.base_url, "Starting chatbox");

    let mut app = App::new(&config)?;

    let mut terminal = tui::init()?;
    tui::install_panic_hook();

    let mut events = EventHandler::new();
    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event)?,
            outcome = app.controller.wait_reply(), if app.controller.is_pending() => {
                app.controller.complete(outcome, Instant::now());
            }
            else => break,
        }
    }
    Ok(())
}

/// Log to a daily file; the terminal belongs to the UI. Failure is not fatal.
fn init_logging() -> Option<WorkerGuard> {
    let log_dir = dirs::data_local_dir()?.join("chatbox").join("logs");
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Could not create log directory {}: {}", log_dir.display(), e);
        return None;
    }

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "chatbox.log"));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .ok()?;

    Some(guard)
}
