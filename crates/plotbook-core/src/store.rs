//! The `BookingStore` and `Notifier` traits.
//!
//! `BookingStore` is implemented by storage backends (`plotbook-store-sqlite`)
//! and by the HTTP client in `plotbook-cli`, so the sync and submission logic
//! in this crate runs unchanged on both sides of the wire.

use std::future::Future;

use crate::{
  booking::{Booking, NewBooking, StoredDocument},
  notification::BookingNotification,
};

/// Abstraction over the booking backend.
///
/// Bookings are insert-only: there is no update or delete path. Documents are
/// write-once binary objects addressed by key.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BookingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All booking records, ordered by id ascending.
  fn list_bookings(
    &self,
  ) -> impl Future<Output = Result<Vec<Booking>, Self::Error>> + Send + '_;

  /// Persist a booking. `id` and `booked_at` are assigned by the store.
  fn insert_booking(
    &self,
    input: NewBooking,
  ) -> impl Future<Output = Result<Booking, Self::Error>> + Send + '_;

  /// Store a binary object under `key`. Returns `false`, leaving the
  /// existing object untouched, if the key is already taken.
  fn put_document(
    &self,
    key: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fetch a stored object. Returns `None` if absent.
  fn get_document(
    &self,
    key: String,
  ) -> impl Future<Output = Result<Option<StoredDocument>, Self::Error>> + Send + '_;
}

/// Something that tells an administrator about a new booking.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn notify<'a>(
    &'a self,
    notification: &'a BookingNotification,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
