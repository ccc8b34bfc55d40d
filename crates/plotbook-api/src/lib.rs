//! JSON REST API for the Plotbook booking store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`plotbook_core::store::BookingStore`], plus a server-sent-events change
//! feed. CORS, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", plotbook_api::api_router(store.clone(), ChangeFeed::default()))
//! ```

pub mod bookings;
pub mod changes;
pub mod documents;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, put},
};
use plotbook_core::store::BookingStore;

pub use changes::ChangeFeed;
pub use error::ApiError;

/// Largest accepted document upload.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub changes: ChangeFeed,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      changes: self.changes.clone(),
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, changes: ChangeFeed) -> Router<()>
where
  S: BookingStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Bookings
    .route(
      "/bookings",
      get(bookings::list::<S>).post(bookings::create::<S>),
    )
    // Documents
    .route(
      "/documents/{key}",
      put(documents::upload::<S>).get(documents::download::<S>),
    )
    // Change feed
    .route("/changes", get(changes::stream::<S>))
    .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES))
    .with_state(ApiState { store, changes })
}

#[cfg(test)]
mod tests;
