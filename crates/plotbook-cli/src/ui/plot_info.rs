//! Plot info card — right panel, follows the grid cursor.

use plotbook_core::plot::{Plot, PlotStatus};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(plot) = app.cursor_plot() else {
    let block = Block::default()
      .title(" Plot ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No plot selected.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let block = Block::default()
    .title(format!(" Plot {} ", plot.id))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  f.render_widget(Paragraph::new(card_lines(plot)).wrap(Wrap { trim: false }), inner);
}

fn card_lines(plot: &Plot) -> Vec<Line<'static>> {
  let status_style = match plot.status {
    PlotStatus::Available => Style::default().fg(Color::Green),
    PlotStatus::Booked => Style::default().fg(Color::Red),
  };

  let mut lines = vec![
    row("Block", plot.block().to_string(), Style::default()),
    row("Number", plot.number().to_string(), Style::default()),
    row("Size", format!("{} sq. yd", plot.size), Style::default()),
    row("Status", plot.status.to_string(), status_style.add_modifier(Modifier::BOLD)),
  ];

  match &plot.booking_info {
    Some(info) => {
      lines.push(row("Booked by", info.booked_by.clone(), Style::default()));
      lines.push(row("Booked on", booked_on(info.booked_at), Style::default()));
    }
    None => {
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(
        "Press Enter to book this plot.",
        Style::default().fg(Color::DarkGray),
      )));
    }
  }
  lines
}

fn row(label: &'static str, value: String, style: Style) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<11}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(value, style),
  ])
}

/// `MMM d, yyyy` in local time, e.g. `Mar 4, 2025`.
fn booked_on(at: chrono::DateTime<chrono::Utc>) -> String {
  at.with_timezone(&chrono::Local).format("%b %-d, %Y").to_string()
}
