//! TUI rendering — orchestrates all panes.

pub mod booking_modal;
pub mod plot_grid;
pub mod plot_info;

use plotbook_core::projection::booked_count;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, ToastKind};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  if let Some(modal) = &app.modal {
    booking_modal::draw(f, centered(area, 64, 20), app, modal);
  }
}

/// A `width` × `height` rectangle centred in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let booked = booked_count(app.sync.plots());
  let total = app.sync.plots().len();

  let left = Span::styled(
    format!(" plotbook  {}  [f] filter  [r] refresh  [q] quit", app.filter),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right_text = if app.sync.is_loading() {
    "Loading… ".to_string()
  } else {
    let synced = app
      .sync
      .last_synced()
      .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
      .unwrap_or_else(|| "never".into());
    format!("{booked}/{total} booked · synced {synced} ")
  };
  let right = Span::styled(right_text, Style::default().fg(Color::Gray));

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(40), Constraint::Length(34)])
    .split(area);

  plot_grid::draw(f, cols[0], app);
  plot_info::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, mode_color) = match &app.toast {
    Some(t) => match t.kind {
      ToastKind::Info => ("INFO", Color::Cyan),
      ToastKind::Warning => ("WARN", Color::Yellow),
      ToastKind::Error => ("ERROR", Color::Red),
    },
    None if app.modal.is_some() => ("BOOK", Color::Green),
    None => ("GRID", Color::Cyan),
  };

  let text = match &app.toast {
    Some(t) => format!("  {}  (Esc to dismiss)", t.message),
    None if app.modal.is_some() => {
      "  Tab/↑↓ field  Enter next  Esc back  Ctrl-C quit".to_string()
    }
    None => "  ←↓↑→/hjkl move  Enter book  Tab/1-3/a filter  r refresh  q quit".to_string(),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(mode_color)
      .add_modifier(Modifier::BOLD),
  );
  let text_span = Span::styled(text, Style::default().fg(Color::Gray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, text_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
