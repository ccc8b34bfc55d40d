//! [`SqliteStore`] — the SQLite implementation of [`BookingStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use plotbook_core::{
  booking::{Booking, NewBooking, StoredDocument},
  store::BookingStore,
};

use crate::{
  Error, Result,
  encode::{RawBooking, RawDocument, encode_date, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A booking store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── BookingStore impl ───────────────────────────────────────────────────────

impl BookingStore for SqliteStore {
  type Error = Error;

  // ── Bookings ──────────────────────────────────────────────────────────────

  async fn list_bookings(&self) -> Result<Vec<Booking>> {
    let raws: Vec<RawBooking> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM plot_bookings ORDER BY id ASC",
          RawBooking::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawBooking::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBooking::into_booking).collect()
  }

  async fn insert_booking(&self, input: NewBooking) -> Result<Booking> {
    let booked_at = Utc::now();
    let at_str = encode_dt(booked_at);
    let visit_str = input.visit_date.map(encode_date);
    let row = input.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO plot_bookings (
             plot_id, block_id, plot_number, booked_by,
             contact_info, phone, visit_date, note, booked_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            row.plot_id,
            row.block_id,
            row.plot_number,
            row.booked_by,
            row.contact_info,
            row.phone,
            visit_str,
            row.note,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Booking {
      id,
      plot_id: input.plot_id,
      block_id: input.block_id,
      plot_number: input.plot_number,
      booked_by: input.booked_by,
      contact_info: input.contact_info,
      phone: input.phone,
      visit_date: input.visit_date,
      note: input.note,
      booked_at,
    })
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn put_document(
    &self,
    key: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
  ) -> Result<bool> {
    let at_str = encode_dt(Utc::now());

    // `key` is the primary key; an existing row makes this a no-op.
    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO documents (key, content_type, bytes, uploaded_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (key) DO NOTHING",
          rusqlite::params![key, content_type, bytes, at_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn get_document(&self, key: String) -> Result<Option<StoredDocument>> {
    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT key, content_type, bytes, uploaded_at
               FROM documents WHERE key = ?1",
              rusqlite::params![key],
              |row| {
                Ok(RawDocument {
                  key:          row.get(0)?,
                  content_type: row.get(1)?,
                  bytes:        row.get(2)?,
                  uploaded_at:  row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }
}
