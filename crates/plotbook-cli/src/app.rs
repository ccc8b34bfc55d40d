//! Application state machine and event dispatcher.

use std::path::Path;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use plotbook_core::{
  booking::DocumentAttachment,
  form::{BookingForm, Field, Step},
  layout::{BlockFilter, BlockLayout, RowWidths, layout},
  plot::{Plot, PlotId},
  submit::submit_booking,
  change::ChangeEvent,
  sync::BookingSync,
};
use tokio::sync::mpsc;

use crate::client::ApiClient;

// ─── Toasts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
  Info,
  Warning,
  Error,
}

/// A dismissible one-line message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub kind:    ToastKind,
  pub message: String,
}

// ─── Booking modal ────────────────────────────────────────────────────────────

/// Inputs on the `AdditionalDetails` step. The date and document path are
/// edited as raw text and only parsed when the visitor moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailInput {
  VisitDate,
  Note,
  Document,
}

/// The booking form plus the text-entry state the terminal needs around it.
#[derive(Debug, Clone)]
pub struct BookingModal {
  pub form:          BookingForm,
  /// Focused input within the current step.
  pub focus:         usize,
  pub date_input:    String,
  pub document_path: String,
  /// Problem with the raw date or document path, shown under the inputs.
  pub input_error:   Option<String>,
  /// Reference of the confirmed booking, on the success screen.
  pub confirmed_id:  Option<i64>,
}

const PERSONAL_FIELDS: [Field; 3] = [Field::Name, Field::Email, Field::Phone];
const DETAIL_INPUTS: [DetailInput; 3] =
  [DetailInput::VisitDate, DetailInput::Note, DetailInput::Document];

impl BookingModal {
  pub fn new(plot: PlotId) -> Self {
    Self {
      form:          BookingForm::new(plot),
      focus:         0,
      date_input:    String::new(),
      document_path: String::new(),
      input_error:   None,
      confirmed_id:  None,
    }
  }

  fn input_count(&self) -> usize {
    match self.form.step() {
      Step::PersonalInfo => PERSONAL_FIELDS.len(),
      Step::AdditionalDetails => DETAIL_INPUTS.len(),
      _ => 0,
    }
  }

  pub fn focused_field(&self) -> Option<Field> {
    (self.form.step() == Step::PersonalInfo).then(|| PERSONAL_FIELDS[self.focus])
  }

  pub fn focused_input(&self) -> Option<DetailInput> {
    (self.form.step() == Step::AdditionalDetails).then(|| DETAIL_INPUTS[self.focus])
  }

  fn focused_buffer(&mut self) -> Option<&mut String> {
    if let Some(field) = self.focused_field() {
      return Some(match field {
        Field::Name => &mut self.form.name,
        Field::Email => &mut self.form.email,
        Field::Phone => &mut self.form.phone,
      });
    }
    match self.focused_input()? {
      DetailInput::VisitDate => Some(&mut self.date_input),
      DetailInput::Note => Some(&mut self.form.note),
      DetailInput::Document => Some(&mut self.document_path),
    }
  }

  fn cycle_focus(&mut self, forward: bool) {
    let n = self.input_count();
    if n == 0 {
      return;
    }
    self.focus = if forward { (self.focus + 1) % n } else { (self.focus + n - 1) % n };
  }

  /// Parse the raw date text into the form. Empty means no preference.
  fn commit_date(&mut self) -> Result<(), String> {
    let raw = self.date_input.trim();
    self.form.visit_date = if raw.is_empty() {
      None
    } else {
      Some(
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
          .map_err(|_| format!("Visit date must be YYYY-MM-DD, got {raw:?}"))?,
      )
    };
    Ok(())
  }

  /// Read the document named by the path input into the form.
  async fn commit_document(&mut self) -> Result<(), String> {
    let raw = self.document_path.trim();
    if raw.is_empty() {
      self.form.document = None;
      return Ok(());
    }
    let path = Path::new(raw);
    let bytes = tokio::fs::read(path)
      .await
      .map_err(|e| format!("Cannot read {raw}: {e}"))?;
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| raw.to_owned());
    self.form.document = Some(DocumentAttachment {
      content_type: guess_content_type(&file_name).map(str::to_owned),
      file_name,
      bytes,
    });
    Ok(())
  }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
  let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
  match ext.as_str() {
    "pdf" => Some("application/pdf"),
    "png" => Some("image/png"),
    "jpg" | "jpeg" => Some("image/jpeg"),
    "webp" => Some("image/webp"),
    _ => None,
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Network work requested by a key press, run after the next frame is drawn
/// so the loading / submitting state is visible while it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
  Refresh,
  Submit,
}

/// Top-level application state.
pub struct App {
  /// Catalog, projection and the API client.
  pub sync:    BookingSync<ApiClient>,
  pub widths:  RowWidths,
  pub filter:  BlockFilter,
  /// Plot under the grid cursor.
  pub cursor:  Option<PlotId>,
  /// Open booking modal, if any.
  pub modal:   Option<BookingModal>,
  pub toast:   Option<Toast>,
  pub pending: Option<Pending>,
}

impl App {
  pub fn new(sync: BookingSync<ApiClient>, widths: RowWidths) -> Self {
    let cursor = sync.plots().first().map(|p| p.id);
    Self {
      sync,
      widths,
      filter: BlockFilter::All,
      cursor,
      modal: None,
      toast: None,
      pending: None,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Queue a full refresh and show the loading state.
  pub fn request_refresh(&mut self) {
    self.sync.mark_loading();
    self.pending = Some(Pending::Refresh);
  }

  /// Drain every change event waiting on `changes`. Any change at all means
  /// a full re-fetch, so a burst is coalesced into one refresh. Returns
  /// whether a refresh was queued.
  pub fn on_changes(&mut self, changes: &mut mpsc::Receiver<ChangeEvent>) -> bool {
    let mut changed = false;
    while let Ok(change) = changes.try_recv() {
      tracing::debug!(?change, "change event");
      changed = true;
    }
    if changed {
      self.request_refresh();
    }
    changed
  }

  /// Run whatever the last key press queued.
  pub async fn run_pending(&mut self) {
    match self.pending.take() {
      Some(Pending::Refresh) => self.refresh().await,
      Some(Pending::Submit) => self.submit().await,
      None => {}
    }
  }

  async fn refresh(&mut self) {
    match self.sync.refresh().await {
      Ok(booked) => tracing::debug!(booked, "projection refreshed"),
      Err(e) => {
        tracing::warn!(error = %e, "refresh failed");
        self.notify(ToastKind::Error, format!("Could not load bookings: {e}  (r to retry)"));
      }
    }
  }

  async fn submit(&mut self) {
    let Some(modal) = self.modal.as_mut() else { return };
    let Some(plot) = self.sync.plot(modal.form.plot()).cloned() else { return };
    let client = self.sync.store();

    match submit_booking(client, client, &plot, &mut modal.form).await {
      Ok(outcome) => {
        tracing::info!(booking_id = outcome.booking.id, plot_id = %plot.id, "booking submitted");
        modal.confirmed_id = Some(outcome.booking.id);
        match outcome.notify_error {
          Some(e) => {
            tracing::warn!(error = %e, "admin notification failed");
            self.notify(
              ToastKind::Warning,
              format!("Plot {} booked, but the admin could not be notified: {e}", plot.id),
            );
          }
          None => self.notify(ToastKind::Info, format!("Plot {} booked", plot.id)),
        }
        self.request_refresh();
      }
      Err(e) => {
        tracing::warn!(error = %e, plot_id = %plot.id, "booking submission failed");
        self.notify(ToastKind::Error, format!("Booking failed: {e}"));
      }
    }
  }

  fn notify(&mut self, kind: ToastKind, message: impl Into<String>) {
    self.toast = Some(Toast { kind, message: message.into() });
  }

  // ── Grid ──────────────────────────────────────────────────────────────────

  /// The visible grid under the current filter.
  pub fn blocks(&self) -> Vec<BlockLayout<'_>> {
    layout(self.sync.plots(), self.filter, &self.widths)
  }

  /// Every visible row across all blocks, top to bottom.
  fn grid_rows(&self) -> Vec<Vec<PlotId>> {
    self
      .blocks()
      .into_iter()
      .flat_map(|b| b.rows)
      .map(|row| row.into_iter().map(|p| p.id).collect())
      .collect()
  }

  pub fn cursor_plot(&self) -> Option<&Plot> {
    self.cursor.and_then(|id| self.sync.plot(id))
  }

  /// Move the cursor by whole rows (`dy`) or cells (`dx`), clamping at edges.
  fn move_cursor(&mut self, dy: isize, dx: isize) {
    let rows = self.grid_rows();
    let Some(first) = rows.first().and_then(|r| r.first()).copied() else {
      self.cursor = None;
      return;
    };
    let Some((r, c)) = self.cursor.and_then(|id| {
      rows
        .iter()
        .enumerate()
        .find_map(|(r, row)| row.iter().position(|p| *p == id).map(|c| (r, c)))
    }) else {
      self.cursor = Some(first);
      return;
    };

    let r = r.saturating_add_signed(dy).min(rows.len() - 1);
    let row = &rows[r];
    let c = if dy == 0 { c.saturating_add_signed(dx) } else { c };
    self.cursor = Some(row[c.min(row.len() - 1)]);
  }

  fn set_filter(&mut self, filter: BlockFilter) {
    self.filter = filter;
    self.cursor = None;
    self.move_cursor(0, 0);
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.modal.is_some() {
      if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('w') {
        self.close_modal();
        return true;
      }
      self.handle_modal_key(key).await;
      return true;
    }
    self.handle_grid_key(key)
  }

  fn handle_grid_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
      KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
      KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
      KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),

      KeyCode::Tab | KeyCode::Char('f') => self.set_filter(self.filter.next()),
      KeyCode::Char('a') => self.set_filter(BlockFilter::All),
      KeyCode::Char(c @ ('1'..='3')) => {
        let idx = c as usize - '0' as usize;
        self.set_filter(BlockFilter::OPTIONS[idx]);
      }

      KeyCode::Char('r') => self.request_refresh(),
      KeyCode::Esc => self.toast = None,

      KeyCode::Enter => self.select_cursor(),

      _ => {}
    }
    true
  }

  /// Open the booking modal for an available plot; a booked plot's details
  /// are already on the info card.
  fn select_cursor(&mut self) {
    let Some(plot) = self.cursor_plot() else { return };
    if plot.is_available() {
      self.modal = Some(BookingModal::new(plot.id));
    } else {
      let by = plot
        .booking_info
        .as_ref()
        .map(|b| b.booked_by.clone())
        .unwrap_or_default();
      let id = plot.id;
      self.notify(ToastKind::Info, format!("Plot {id} is already booked by {by}"));
    }
  }

  /// Abandon the form. Not while a submission is queued or in flight.
  fn close_modal(&mut self) {
    let busy = self.pending == Some(Pending::Submit)
      || self.modal.as_ref().is_some_and(|m| m.form.step() == Step::Submitting);
    if !busy {
      self.modal = None;
    }
  }

  async fn handle_modal_key(&mut self, key: KeyEvent) {
    let Some(modal) = self.modal.as_mut() else { return };

    match modal.form.step() {
      Step::Submitting => {}
      Step::Success => {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
          self.modal = None;
        }
      }
      Step::Review => match key.code {
        KeyCode::Enter => {
          if self.pending.is_none() {
            self.pending = Some(Pending::Submit);
          }
        }
        KeyCode::Esc | KeyCode::Backspace => {
          modal.form.back();
          modal.focus = 0;
        }
        _ => {}
      },
      step @ (Step::PersonalInfo | Step::AdditionalDetails) => match key.code {
        KeyCode::Esc if step == Step::PersonalInfo => self.modal = None,
        KeyCode::Esc => {
          modal.form.back();
          modal.focus = 0;
          modal.input_error = None;
        }
        KeyCode::Tab | KeyCode::Down => modal.cycle_focus(true),
        KeyCode::BackTab | KeyCode::Up => modal.cycle_focus(false),
        KeyCode::Backspace => {
          if let Some(buf) = modal.focused_buffer() {
            buf.pop();
          }
        }
        KeyCode::Char(c) => {
          if let Some(buf) = modal.focused_buffer() {
            buf.push(c);
          }
        }
        KeyCode::Enter => {
          if step == Step::AdditionalDetails {
            let committed = match modal.commit_date() {
              Ok(()) => modal.commit_document().await,
              Err(e) => Err(e),
            };
            if let Err(e) = committed {
              modal.input_error = Some(e);
              return;
            }
            modal.input_error = None;
          }
          if modal.form.next().is_ok() {
            modal.focus = 0;
          }
        }
        _ => {}
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use plotbook_core::{
    booking::Booking,
    catalog::{CatalogConfig, build_catalog},
    plot::{Block, PlotStatus},
  };

  use super::*;
  use crate::client::ApiConfig;

  fn app() -> App {
    let client = ApiClient::new(ApiConfig::for_server("http://127.0.0.1:9")).unwrap();
    let sync = BookingSync::new(client, build_catalog(&CatalogConfig::default()));
    App::new(sync, RowWidths::default())
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn ctrl(c: char) -> KeyEvent { KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL) }

  fn modal_at_review() -> BookingModal {
    let mut modal = BookingModal::new(id("A-1"));
    modal.form.name = "Jane Doe".into();
    modal.form.email = "jane@example.com".into();
    modal.form.phone = "5550101234".into();
    modal.form.next().unwrap();
    modal.form.next().unwrap();
    modal
  }

  async fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      app.handle_key(key(KeyCode::Char(c))).await;
    }
  }

  fn id(s: &str) -> PlotId { s.parse().unwrap() }

  fn booking(plot: &str, by: &str) -> Booking {
    let plot_id = id(plot);
    Booking {
      id:           1,
      plot_id:      plot_id.to_string(),
      block_id:     plot_id.block.to_string(),
      plot_number:  plot_id.number,
      booked_by:    by.into(),
      contact_info: None,
      phone:        None,
      visit_date:   None,
      note:         None,
      booked_at:    chrono::Utc::now(),
    }
  }

  #[tokio::test]
  async fn cursor_moves_by_cell_and_row() {
    let mut app = app();
    assert_eq!(app.cursor, Some(id("A-1")));

    app.handle_key(key(KeyCode::Right)).await;
    assert_eq!(app.cursor, Some(id("A-2")));

    // Block A rows are 10 wide.
    app.handle_key(key(KeyCode::Down)).await;
    assert_eq!(app.cursor, Some(id("A-12")));

    app.handle_key(key(KeyCode::Left)).await;
    app.handle_key(key(KeyCode::Left)).await;
    app.handle_key(key(KeyCode::Left)).await;
    assert_eq!(app.cursor, Some(id("A-11")));

    app.handle_key(key(KeyCode::Up)).await;
    app.handle_key(key(KeyCode::Up)).await;
    assert_eq!(app.cursor, Some(id("A-1")));
  }

  #[tokio::test]
  async fn cursor_crosses_into_next_block() {
    let mut app = app();
    // A has 125 plots in rows of 10: 13 rows, the last holding 5.
    for _ in 0..12 {
      app.handle_key(key(KeyCode::Down)).await;
    }
    assert_eq!(app.cursor, Some(id("A-121")));
    app.handle_key(key(KeyCode::Down)).await;
    assert_eq!(app.cursor, Some(id("B-1")));
  }

  #[tokio::test]
  async fn filter_cycles_and_resets_cursor() {
    let mut app = app();
    app.handle_key(key(KeyCode::Tab)).await;
    assert_eq!(app.filter, BlockFilter::Only(Block::A));
    app.handle_key(key(KeyCode::Tab)).await;
    assert_eq!(app.filter, BlockFilter::Only(Block::B));
    assert_eq!(app.cursor, Some(id("B-1")));
    assert!(app.blocks().iter().all(|b| b.block == Block::B));

    app.handle_key(key(KeyCode::Char('3'))).await;
    assert_eq!(app.cursor, Some(id("C-1")));
    app.handle_key(key(KeyCode::Char('a'))).await;
    assert_eq!(app.filter, BlockFilter::All);
    assert_eq!(app.blocks().len(), 3);
  }

  #[tokio::test]
  async fn enter_on_available_plot_opens_form() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter)).await;
    let modal = app.modal.as_ref().unwrap();
    assert_eq!(modal.form.plot(), id("A-1"));
    assert_eq!(modal.form.step(), Step::PersonalInfo);
  }

  #[tokio::test]
  async fn enter_on_booked_plot_does_not_open_form() {
    let mut app = app();
    app.sync.apply(&[booking("A-1", "Jane Doe")]);
    assert_eq!(app.cursor_plot().unwrap().status, PlotStatus::Booked);

    app.handle_key(key(KeyCode::Enter)).await;
    assert!(app.modal.is_none());
    assert!(app.toast.as_ref().unwrap().message.contains("Jane Doe"));
  }

  #[tokio::test]
  async fn short_name_keeps_form_on_personal_info() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter)).await;
    type_str(&mut app, "J").await;
    app.handle_key(key(KeyCode::Tab)).await;
    type_str(&mut app, "j@x.com").await;
    app.handle_key(key(KeyCode::Tab)).await;
    type_str(&mut app, "5550101234").await;
    app.handle_key(key(KeyCode::Enter)).await;

    let form = &app.modal.as_ref().unwrap().form;
    assert_eq!(form.step(), Step::PersonalInfo);
    assert!(form.errors().get(Field::Name).is_some());
    assert_eq!(form.email, "j@x.com");
  }

  #[tokio::test]
  async fn walks_to_review_and_queues_submit() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter)).await;
    type_str(&mut app, "Jane Doe").await;
    app.handle_key(key(KeyCode::Tab)).await;
    type_str(&mut app, "jane@example.com").await;
    app.handle_key(key(KeyCode::Tab)).await;
    type_str(&mut app, "5550101234").await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.modal.as_ref().unwrap().form.step(), Step::AdditionalDetails);

    type_str(&mut app, "2025-05-02").await;
    app.handle_key(key(KeyCode::Enter)).await;
    let modal = app.modal.as_ref().unwrap();
    assert_eq!(modal.form.step(), Step::Review);
    assert_eq!(modal.form.visit_date, NaiveDate::from_ymd_opt(2025, 5, 2));

    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.pending, Some(Pending::Submit));
  }

  #[tokio::test]
  async fn bad_date_blocks_details_step() {
    let mut app = app();
    app.modal = Some(BookingModal::new(id("A-1")));
    let modal = app.modal.as_mut().unwrap();
    modal.form.name = "Jane Doe".into();
    modal.form.email = "jane@example.com".into();
    modal.form.phone = "5550101234".into();
    modal.form.next().unwrap();

    type_str(&mut app, "May 2").await;
    app.handle_key(key(KeyCode::Enter)).await;
    let modal = app.modal.as_ref().unwrap();
    assert_eq!(modal.form.step(), Step::AdditionalDetails);
    assert!(modal.input_error.as_ref().unwrap().contains("YYYY-MM-DD"));
  }

  #[tokio::test]
  async fn escape_backs_out_then_closes() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter)).await;
    app.handle_key(key(KeyCode::Esc)).await;
    assert!(app.modal.is_none());
  }

  #[tokio::test]
  async fn ctrl_w_closes_form_from_any_editable_step() {
    let mut app = app();
    app.modal = Some(modal_at_review());

    app.handle_key(key(KeyCode::Esc)).await;
    assert_eq!(app.modal.as_ref().unwrap().form.step(), Step::AdditionalDetails);
    app.handle_key(ctrl('w')).await;
    assert!(app.modal.is_none());

    app.modal = Some(modal_at_review());
    app.handle_key(ctrl('w')).await;
    assert!(app.modal.is_none());
  }

  #[tokio::test]
  async fn ctrl_w_does_not_type_into_fields() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter)).await;
    type_str(&mut app, "Jane").await;
    assert_eq!(app.modal.as_ref().unwrap().form.name, "Jane");
    app.handle_key(ctrl('w')).await;
    assert!(app.modal.is_none());
  }

  #[tokio::test]
  async fn queued_submit_keeps_form_open() {
    let mut app = app();
    app.modal = Some(modal_at_review());
    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.pending, Some(Pending::Submit));

    app.handle_key(ctrl('w')).await;
    assert!(app.modal.is_some());
  }

  #[test]
  fn change_event_queues_refresh() {
    let mut app = app();
    let (tx, mut rx) = mpsc::channel(4);
    tx.try_send(ChangeEvent::booking_inserted(1)).unwrap();

    assert!(app.on_changes(&mut rx));
    assert_eq!(app.pending, Some(Pending::Refresh));
    assert!(app.sync.is_loading());
  }

  #[test]
  fn burst_of_changes_is_one_refresh() {
    let mut app = app();
    let (tx, mut rx) = mpsc::channel(4);
    tx.try_send(ChangeEvent::booking_inserted(1)).unwrap();
    tx.try_send(ChangeEvent::booking_inserted(2)).unwrap();
    tx.try_send(ChangeEvent::resync()).unwrap();

    assert!(app.on_changes(&mut rx));
    assert!(rx.try_recv().is_err());
    assert_eq!(app.pending, Some(Pending::Refresh));
  }

  #[test]
  fn no_changes_leaves_app_idle() {
    let mut app = app();
    let (_tx, mut rx) = mpsc::channel::<ChangeEvent>(4);
    assert!(!app.on_changes(&mut rx));
    assert_eq!(app.pending, None);
    assert!(!app.sync.is_loading());
  }

  #[test]
  fn content_type_from_extension() {
    assert_eq!(guess_content_type("id.PDF"), Some("application/pdf"));
    assert_eq!(guess_content_type("scan.jpeg"), Some("image/jpeg"));
    assert_eq!(guess_content_type("notes"), None);
  }
}
