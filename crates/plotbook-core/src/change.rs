//! Row-level change notifications for the booking table.
//!
//! Subscribers are not expected to apply these incrementally: any event is a
//! signal to re-fetch the full booking list.

use serde::{Deserialize, Serialize};

/// Name of the booking table as it appears in change events.
pub const BOOKINGS_TABLE: &str = "plot_bookings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
  Insert,
  Update,
  Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
  pub table:      String,
  pub kind:       ChangeKind,
  /// The affected booking, when known.
  pub booking_id: Option<i64>,
}

impl ChangeEvent {
  pub fn booking_inserted(booking_id: i64) -> Self {
    Self {
      table:      BOOKINGS_TABLE.to_owned(),
      kind:       ChangeKind::Insert,
      booking_id: Some(booking_id),
    }
  }

  /// Emitted when a subscriber fell behind and missed events; tells it to
  /// re-fetch without naming a row.
  pub fn resync() -> Self {
    Self {
      table:      BOOKINGS_TABLE.to_owned(),
      kind:       ChangeKind::Update,
      booking_id: None,
    }
  }
}
