//! Handlers for `/bookings` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/bookings` | All bookings, oldest first |
//! | `POST` | `/bookings` | Body: [`NewBooking`]; returns 201 + stored booking |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use plotbook_core::{
  booking::{Booking, NewBooking},
  change::ChangeEvent,
  store::BookingStore,
};

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /bookings`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Booking>>, ApiError>
where
  S: BookingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let bookings = state
    .store
    .list_bookings()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(bookings))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /bookings` — returns 201 + the stored [`Booking`] and publishes an
/// insert event on the change feed.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(mut body): Json<NewBooking>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookingStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.booked_by.trim().is_empty() {
    return Err(ApiError::BadRequest("booked_by must not be empty".into()));
  }
  body
    .canonicalize()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let booking = state
    .store
    .insert_booking(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(booking_id = booking.id, plot_id = %booking.plot_id, "booking recorded");
  state.changes.publish(ChangeEvent::booking_inserted(booking.id));

  Ok((StatusCode::CREATED, Json(booking)))
}
