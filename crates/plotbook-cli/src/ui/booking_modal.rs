//! Booking modal — the multi-step form drawn over the grid.

use plotbook_core::form::{Field, Step};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, BookingModal, DetailInput, Pending};

const LABEL_WIDTH: usize = 14;

pub fn draw(f: &mut Frame, area: Rect, app: &App, modal: &BookingModal) {
  let form = &modal.form;
  let step_label = match form.step().ordinal() {
    Some(n) => format!("Step {n} of 3 · {}", form.step()),
    None => form.step().to_string(),
  };

  let block = Block::default()
    .title(format!(" Book plot {} · {step_label} ", form.plot()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Green));
  let inner = block.inner(area);
  f.render_widget(Clear, area);
  f.render_widget(block, area);

  let submitting = app.pending == Some(Pending::Submit) || form.step() == Step::Submitting;
  let lines = match form.step() {
    Step::PersonalInfo => personal_info(modal),
    Step::AdditionalDetails => additional_details(modal),
    Step::Review if submitting => vec![hint("Submitting your booking…")],
    Step::Review | Step::Submitting => review(app, modal),
    Step::Success => success(modal),
  };

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ─── Steps ────────────────────────────────────────────────────────────────────

fn personal_info(modal: &BookingModal) -> Vec<Line<'static>> {
  let form = &modal.form;
  let focused = modal.focused_field();
  let mut lines = Vec::new();

  for (field, label, value) in [
    (Field::Name, "Full name", &form.name),
    (Field::Email, "Email", &form.email),
    (Field::Phone, "Phone", &form.phone),
  ] {
    lines.push(input(label, value, focused == Some(field)));
    if let Some(err) = form.errors().get(field) {
      lines.push(error(err));
    }
  }

  lines.push(Line::from(""));
  lines.push(hint("Enter to continue · Esc to cancel"));
  lines
}

fn additional_details(modal: &BookingModal) -> Vec<Line<'static>> {
  let focused = modal.focused_input();
  let mut lines = vec![
    input(
      "Visit date",
      &modal.date_input,
      focused == Some(DetailInput::VisitDate),
    ),
    hint("  optional, YYYY-MM-DD"),
    input("Note", &modal.form.note, focused == Some(DetailInput::Note)),
    input(
      "Government ID",
      &modal.document_path,
      focused == Some(DetailInput::Document),
    ),
    hint("  optional, path to a PDF or image"),
  ];
  if let Some(err) = &modal.input_error {
    lines.push(error(err));
  }
  lines.push(Line::from(""));
  lines.push(hint("Enter to review · Esc to go back · Ctrl-W to cancel"));
  lines
}

fn review(app: &App, modal: &BookingModal) -> Vec<Line<'static>> {
  let form = &modal.form;
  let size = app
    .sync
    .plot(form.plot())
    .map(|p| format!("{} sq. yd", p.size))
    .unwrap_or_default();
  let or_dash = |s: &str| if s.trim().is_empty() { "—".to_string() } else { s.trim().to_string() };

  let mut lines = vec![
    value("Plot", format!("{} ({size})", form.plot())),
    value("Name", form.name.trim().to_string()),
    value("Email", or_dash(&form.email)),
    value("Phone", or_dash(&form.phone)),
    value(
      "Visit date",
      form
        .visit_date
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "—".into()),
    ),
    value("Note", or_dash(&form.note)),
    value(
      "Government ID",
      form
        .document
        .as_ref()
        .map(|d| d.file_name.clone())
        .unwrap_or_else(|| "—".into()),
    ),
  ];

  if let Some(err) = form.submit_error() {
    lines.push(Line::from(""));
    lines.push(error(err));
  }
  lines.push(Line::from(""));
  lines.push(hint("Enter to confirm booking · Esc to edit · Ctrl-W to cancel"));
  lines
}

fn success(modal: &BookingModal) -> Vec<Line<'static>> {
  let reference = modal
    .confirmed_id
    .map(|id| format!("Reference #{id}"))
    .unwrap_or_default();
  vec![
    Line::from(Span::styled(
      format!("Plot {} is booked!", modal.form.plot()),
      Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD),
    )),
    Line::from(reference),
    Line::from(""),
    Line::from("We'll contact you to confirm your visit."),
    Line::from(""),
    hint("Enter to close"),
  ]
}

// ─── Line helpers ─────────────────────────────────────────────────────────────

fn input(label: &str, value: &str, focused: bool) -> Line<'static> {
  let value_style = if focused {
    Style::default().fg(Color::White).bg(Color::Blue)
  } else {
    Style::default()
  };
  let cursor = if focused { "_" } else { "" };
  Line::from(vec![
    Span::styled(
      format!("{label:<LABEL_WIDTH$}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("{value}{cursor}"), value_style),
  ])
}

fn value(label: &str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{label:<LABEL_WIDTH$}"), Style::default().fg(Color::Cyan)),
    Span::raw(value),
  ])
}

fn error(message: &str) -> Line<'static> {
  Line::from(Span::styled(
    format!("  {message}"),
    Style::default().fg(Color::Red),
  ))
}

fn hint(text: &'static str) -> Line<'static> {
  Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}
