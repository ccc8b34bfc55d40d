//! Booking records and uploaded identity documents.
//!
//! A booking is written once per submission and never updated or cancelled.
//! Nothing at this layer prevents two bookings for the same plot; the
//! projection shows the earliest one.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  plot::{Block, PlotId},
};

// ─── Booking ─────────────────────────────────────────────────────────────────

/// A persisted booking row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
  /// Store-assigned identifier.
  pub id:           i64,
  pub plot_id:      String,
  pub block_id:     String,
  pub plot_number:  u32,
  pub booked_by:    String,
  pub contact_info: Option<String>,
  pub phone:        Option<String>,
  pub visit_date:   Option<NaiveDate>,
  pub note:         Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub booked_at:    DateTime<Utc>,
}

// ─── NewBooking ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::BookingStore::insert_booking`].
/// `id` and `booked_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
  pub plot_id:      String,
  pub block_id:     String,
  pub plot_number:  u32,
  pub booked_by:    String,
  #[serde(default)]
  pub contact_info: Option<String>,
  #[serde(default)]
  pub phone:        Option<String>,
  #[serde(default)]
  pub visit_date:   Option<NaiveDate>,
  #[serde(default)]
  pub note:         Option<String>,
}

impl NewBooking {
  /// A booking for `plot` with every optional field left empty.
  pub fn new(plot: PlotId, booked_by: impl Into<String>) -> Self {
    Self {
      plot_id:      plot.to_string(),
      block_id:     plot.block.to_string(),
      plot_number:  plot.number,
      booked_by:    booked_by.into(),
      contact_info: None,
      phone:        None,
      visit_date:   None,
      note:         None,
    }
  }

  /// Parse `plot_id` and check that it agrees with `block_id` and
  /// `plot_number`.
  pub fn plot(&self) -> Result<PlotId> {
    let id: PlotId = self.plot_id.parse()?;
    let block: Block = self.block_id.parse()?;
    if id.block != block || id.number != self.plot_number {
      return Err(Error::PlotIdMismatch {
        plot_id: self.plot_id.clone(),
        block:   self.block_id.clone(),
        number:  self.plot_number,
      });
    }
    Ok(id)
  }

  /// Check identity as [`Self::plot`] does, then rewrite `plot_id` and
  /// `block_id` in their canonical form (`"a-01"` becomes `"A-1"`), which is
  /// what the projection matches on.
  pub fn canonicalize(&mut self) -> Result<PlotId> {
    let id = self.plot()?;
    self.plot_id = id.to_string();
    self.block_id = id.block.to_string();
    Ok(id)
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A binary object held by the store, e.g. an uploaded government ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
  pub key:          String,
  pub content_type: Option<String>,
  pub bytes:        Vec<u8>,
  pub uploaded_at:  DateTime<Utc>,
}

/// A file picked by the visitor, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAttachment {
  /// Original file name; only its extension is kept in the storage key.
  pub file_name:    String,
  pub content_type: Option<String>,
  pub bytes:        Vec<u8>,
}

/// Storage key for a booking's identity document:
/// `{booking_id}-govid.{extension}`.
///
/// The extension is taken from the original file name and lowercased; files
/// without one are stored as `bin`.
pub fn document_key(booking_id: i64, file_name: &str) -> String {
  let ext = Path::new(file_name)
    .extension()
    .and_then(|e| e.to_str())
    .filter(|e| !e.is_empty())
    .map(str::to_ascii_lowercase)
    .unwrap_or_else(|| "bin".to_owned());
  format!("{booking_id}-govid.{ext}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn document_key_keeps_original_extension() {
    assert_eq!(document_key(42, "passport.PDF"), "42-govid.pdf");
    assert_eq!(document_key(7, "scan.front.jpg"), "7-govid.jpg");
    assert_eq!(document_key(7, "README"), "7-govid.bin");
  }

  #[test]
  fn new_booking_identity_must_agree() {
    let mut b = NewBooking::new(PlotId::new(Block::C, 12), "Jane Doe");
    assert_eq!(b.plot().unwrap(), PlotId::new(Block::C, 12));

    b.plot_number = 13;
    assert!(matches!(b.plot(), Err(Error::PlotIdMismatch { .. })));
  }

  #[test]
  fn canonicalize_rewrites_loose_identity() {
    let mut b = NewBooking::new(PlotId::new(Block::A, 1), "Jane Doe");
    b.plot_id = "a-01".into();
    b.block_id = " a".into();

    assert_eq!(b.canonicalize().unwrap(), PlotId::new(Block::A, 1));
    assert_eq!(b.plot_id, "A-1");
    assert_eq!(b.block_id, "A");
  }
}
