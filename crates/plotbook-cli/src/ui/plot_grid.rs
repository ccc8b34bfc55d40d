//! Plot grid — left panel. One titled section per block, one line per row.

use plotbook_core::plot::Plot;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

/// Width of one plot cell, including its trailing gap.
const CELL_WIDTH: usize = 5;

/// Render the grid into `area`, scrolled so the cursor stays visible.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" Plots — {} ", app.filter))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let blocks = app.blocks();
  if blocks.is_empty() {
    let msg = if app.sync.is_loading() { "Loading plots…" } else { "No plots to show." };
    f.render_widget(
      Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let mut lines: Vec<Line> = Vec::new();
  let mut cursor_line = 0;

  for section in &blocks {
    if !lines.is_empty() {
      lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
      format!("Block {}  ({} plots)", section.block, section.plot_count()),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )));

    for row in &section.rows {
      if row.iter().any(|p| Some(p.id) == app.cursor) {
        cursor_line = lines.len();
      }
      let spans: Vec<Span> = row
        .iter()
        .flat_map(|plot| [cell(plot, Some(plot.id) == app.cursor), Span::raw(" ")])
        .collect();
      lines.push(Line::from(spans));
    }
  }

  lines.push(Line::from(""));
  lines.push(legend());

  // Keep the cursor row roughly a third of the way down once scrolling.
  let height = inner.height as usize;
  let scroll = if cursor_line < height { 0 } else { cursor_line.saturating_sub(height / 3) };

  f.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), inner);
}

fn cell(plot: &Plot, under_cursor: bool) -> Span<'static> {
  let mut style = if plot.is_available() {
    Style::default().fg(Color::Black).bg(Color::Green)
  } else {
    Style::default().fg(Color::White).bg(Color::Red)
  };
  if under_cursor {
    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
  }
  Span::styled(format!("{:>width$}", plot.number(), width = CELL_WIDTH - 1), style)
}

fn legend() -> Line<'static> {
  Line::from(vec![
    Span::styled("    ", Style::default().bg(Color::Green)),
    Span::raw(" available   "),
    Span::styled("    ", Style::default().bg(Color::Red)),
    Span::raw(" booked"),
  ])
}
