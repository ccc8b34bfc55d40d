//! `POST /notify-booking` — forwards a booking event to the admin by email.
//!
//! The relay has no business logic: it parses the payload, renders the
//! email and hands it to the [`Mailer`]. Failures are logged and reported to
//! the caller; they never touch the booking itself, which was persisted
//! before the relay was called.

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::State,
  http::{HeaderName, Method, StatusCode, header},
  response::IntoResponse,
  routing::post,
};
use bytes::Bytes;
use chrono::Utc;
use plotbook_core::notification::BookingNotification;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::{
  RelayConfig, email,
  error::Error,
  mailer::Mailer,
};

pub const NOTIFY_PATH: &str = "/notify-booking";

/// Shared state for the relay handler.
pub struct RelayState<M> {
  pub mailer: Arc<M>,
  pub config: Arc<RelayConfig>,
}

impl<M> Clone for RelayState<M> {
  fn clone(&self) -> Self {
    Self {
      mailer: Arc::clone(&self.mailer),
      config: Arc::clone(&self.config),
    }
  }
}

/// Permissive CORS: any origin, and the headers browser SDK clients send.
pub fn cors() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::POST, Method::OPTIONS])
    .allow_headers([
      header::AUTHORIZATION,
      HeaderName::from_static("x-client-info"),
      HeaderName::from_static("apikey"),
      header::CONTENT_TYPE,
    ])
}

pub fn router<M: Mailer + 'static>(state: RelayState<M>) -> Router<()> {
  Router::new()
    .route(NOTIFY_PATH, post(notify::<M>).options(preflight))
    .layer(cors())
    .with_state(state)
}

/// Bare `OPTIONS` without CORS request headers; the CORS layer answers real
/// pre-flight requests before they reach this.
async fn preflight() -> StatusCode { StatusCode::OK }

async fn notify<M: Mailer>(
  State(state): State<RelayState<M>>,
  body: Bytes,
) -> Result<impl IntoResponse, Error> {
  let notification: BookingNotification = serde_json::from_slice(&body)
    .map_err(|e| {
      tracing::warn!(error = %e, "rejected malformed notification payload");
      Error::BadRequest(e.to_string())
    })?;

  let message = email::render(
    &notification,
    &state.config.from_address,
    &state.config.admin_email,
    Utc::now(),
  );

  if let Err(e) = state.mailer.send(&message).await {
    tracing::error!(
      error = %e,
      plot_id = %notification.plot.id,
      booking_id = notification.booking.id,
      "booking notification failed",
    );
    return Err(e.into());
  }

  tracing::info!(
    plot_id = %notification.plot.id,
    booking_id = notification.booking.id,
    "booking notification sent",
  );
  Ok(Json(json!({ "success": true })))
}
