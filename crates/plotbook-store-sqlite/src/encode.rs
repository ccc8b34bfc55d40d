//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, Utc};
use plotbook_core::booking::{Booking, StoredDocument};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column values as read from `plot_bookings`, before decoding.
pub struct RawBooking {
  pub id:           i64,
  pub plot_id:      String,
  pub block_id:     String,
  pub plot_number:  u32,
  pub booked_by:    String,
  pub contact_info: Option<String>,
  pub phone:        Option<String>,
  pub visit_date:   Option<String>,
  pub note:         Option<String>,
  pub booked_at:    String,
}

impl RawBooking {
  pub const COLUMNS: &str = "id, plot_id, block_id, plot_number, booked_by, \
                             contact_info, phone, visit_date, note, booked_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      plot_id:      row.get(1)?,
      block_id:     row.get(2)?,
      plot_number:  row.get(3)?,
      booked_by:    row.get(4)?,
      contact_info: row.get(5)?,
      phone:        row.get(6)?,
      visit_date:   row.get(7)?,
      note:         row.get(8)?,
      booked_at:    row.get(9)?,
    })
  }

  pub fn into_booking(self) -> Result<Booking> {
    Ok(Booking {
      id:           self.id,
      plot_id:      self.plot_id,
      block_id:     self.block_id,
      plot_number:  self.plot_number,
      booked_by:    self.booked_by,
      contact_info: self.contact_info,
      phone:        self.phone,
      visit_date:   self.visit_date.as_deref().map(decode_date).transpose()?,
      note:         self.note,
      booked_at:    decode_dt(&self.booked_at)?,
    })
  }
}

/// Column values as read from `documents`.
pub struct RawDocument {
  pub key:          String,
  pub content_type: Option<String>,
  pub bytes:        Vec<u8>,
  pub uploaded_at:  String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<StoredDocument> {
    Ok(StoredDocument {
      key:          self.key,
      content_type: self.content_type,
      bytes:        self.bytes,
      uploaded_at:  decode_dt(&self.uploaded_at)?,
    })
  }
}
