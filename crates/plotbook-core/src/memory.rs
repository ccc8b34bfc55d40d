//! In-memory `BookingStore` and `Notifier` fakes for unit tests.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use thiserror::Error;

use crate::{
  booking::{Booking, NewBooking, StoredDocument},
  notification::BookingNotification,
  store::{BookingStore, Notifier},
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

#[derive(Default)]
pub struct MemoryStore {
  bookings:       Mutex<Vec<Booking>>,
  documents:      Mutex<HashMap<String, StoredDocument>>,
  fail_inserts:   bool,
  fail_documents: bool,
  fail_reads:     AtomicBool,
}

impl MemoryStore {
  pub fn failing_inserts() -> Self {
    Self { fail_inserts: true, ..Self::default() }
  }

  pub fn failing_documents() -> Self {
    Self { fail_documents: true, ..Self::default() }
  }

  pub fn set_fail_reads(&self, fail: bool) {
    self.fail_reads.store(fail, Ordering::SeqCst);
  }

  pub fn bookings(&self) -> Vec<Booking> { self.bookings.lock().unwrap().clone() }

  pub fn document(&self, key: &str) -> Option<StoredDocument> {
    self.documents.lock().unwrap().get(key).cloned()
  }
}

impl BookingStore for MemoryStore {
  type Error = FakeError;

  async fn list_bookings(&self) -> Result<Vec<Booking>, FakeError> {
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(FakeError("read failed".into()));
    }
    Ok(self.bookings())
  }

  async fn insert_booking(&self, input: NewBooking) -> Result<Booking, FakeError> {
    if self.fail_inserts {
      return Err(FakeError("insert failed".into()));
    }
    let mut bookings = self.bookings.lock().unwrap();
    let booking = Booking {
      id:           bookings.len() as i64 + 1,
      plot_id:      input.plot_id,
      block_id:     input.block_id,
      plot_number:  input.plot_number,
      booked_by:    input.booked_by,
      contact_info: input.contact_info,
      phone:        input.phone,
      visit_date:   input.visit_date,
      note:         input.note,
      booked_at:    Utc::now(),
    };
    bookings.push(booking.clone());
    Ok(booking)
  }

  async fn put_document(
    &self,
    key: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
  ) -> Result<bool, FakeError> {
    if self.fail_documents {
      return Err(FakeError("upload failed".into()));
    }
    let mut documents = self.documents.lock().unwrap();
    if documents.contains_key(&key) {
      return Ok(false);
    }
    documents.insert(key.clone(), StoredDocument {
      key,
      content_type,
      bytes,
      uploaded_at: Utc::now(),
    });
    Ok(true)
  }

  async fn get_document(&self, key: String) -> Result<Option<StoredDocument>, FakeError> {
    Ok(self.document(&key))
  }
}

#[derive(Default)]
pub struct RecordingNotifier {
  sent: Mutex<Vec<BookingNotification>>,
  fail: bool,
}

impl RecordingNotifier {
  pub fn failing() -> Self { Self { fail: true, ..Self::default() } }

  pub fn sent(&self) -> Vec<BookingNotification> { self.sent.lock().unwrap().clone() }
}

impl Notifier for RecordingNotifier {
  type Error = FakeError;

  async fn notify(&self, notification: &BookingNotification) -> Result<(), FakeError> {
    if self.fail {
      return Err(FakeError("relay unavailable".into()));
    }
    self.sent.lock().unwrap().push(notification.clone());
    Ok(())
  }
}
