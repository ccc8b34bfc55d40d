//! `plotbook` — terminal UI for browsing and booking plots.
//!
//! # Usage
//!
//! ```
//! plotbook --url http://localhost:8080
//! plotbook --config ~/.config/plotbook/config.toml --log-file /tmp/plotbook.log
//! ```

mod app;
mod client;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotbook_core::{
  catalog::{CatalogConfig, build_catalog},
  change::ChangeEvent,
  layout::RowWidths,
  sync::BookingSync,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";

/// Delay before re-subscribing after the change feed drops.
const FEED_RETRY: Duration = Duration::from_secs(3);

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "plotbook", about = "Terminal UI for plot bookings")]
struct Args {
  /// Path to a TOML config file (url, relay_url, row_widths).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the plotbook server (default: http://localhost:8080).
  #[arg(long, env = "PLOTBOOK_URL")]
  url: Option<String>,

  /// Notification relay endpoint (default: <url>/notify-booking).
  #[arg(long, env = "PLOTBOOK_RELAY_URL")]
  relay_url: Option<String>,

  /// Write logs to this file. Nothing is logged otherwise.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:        String,
  #[serde(default)]
  relay_url:  String,
  #[serde(default)]
  row_widths: Option<RowWidths>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_file_logging(path)?;
  }

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let mut api_config = ApiConfig::for_server(base_url);
  if let Some(relay_url) = args
    .relay_url
    .or_else(|| (!file_cfg.relay_url.is_empty()).then(|| file_cfg.relay_url.clone()))
  {
    api_config.relay_url = relay_url;
  }

  let widths = file_cfg.row_widths.unwrap_or_default();
  widths.validate().context("invalid row_widths in config file")?;

  tracing::info!(url = %api_config.base_url, relay = %api_config.relay_url, "starting");
  let client = ApiClient::new(api_config).context("failed to build HTTP client")?;

  let (tx, rx) = mpsc::channel(16);
  let feed = {
    let client = client.clone();
    tokio::spawn(async move { client.follow_changes(tx, FEED_RETRY).await })
  };

  let sync = BookingSync::new(client, build_catalog(&CatalogConfig::default()));
  let mut app = App::new(sync, widths);
  app.request_refresh();

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app, rx).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();
  feed.abort();

  run_result
}

fn init_file_logging(path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  mut changes: mpsc::Receiver<ChangeEvent>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    if app.pending.is_some() {
      app.run_pending().await;
      continue;
    }

    if app.on_changes(&mut changes) {
      continue;
    }

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if key.kind != event::KeyEventKind::Press {
        continue;
      }
      if !app.handle_key(key).await {
        break;
      }
    }
  }

  Ok(())
}
