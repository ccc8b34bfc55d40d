//! HTTP server for Plotbook.
//!
//! Mounts the booking API (`/api/...`) backed by any [`BookingStore`], and
//! the notification relay (`/notify-booking`) backed by any [`Mailer`].

pub mod email;
pub mod error;
pub mod mailer;
pub mod relay;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use plotbook_api::ChangeFeed;
use plotbook_core::store::BookingStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use mailer::Mailer;
use relay::RelayState;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PLOTBOOK_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub relay:      RelayConfig,
}

/// Where booking notifications go and how they are sent.
#[derive(Deserialize, Clone)]
pub struct RelayConfig {
  #[serde(default = "default_admin_email")]
  pub admin_email:     String,
  #[serde(default = "default_from_address")]
  pub from_address:    String,
  #[serde(default)]
  pub resend_api_key:  String,
  #[serde(default = "default_resend_base_url")]
  pub resend_base_url: String,
}

impl Default for RelayConfig {
  fn default() -> Self {
    Self {
      admin_email:     default_admin_email(),
      from_address:    default_from_address(),
      resend_api_key:  String::new(),
      resend_base_url: default_resend_base_url(),
    }
  }
}

// Keep the API key out of logs.
impl std::fmt::Debug for RelayConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RelayConfig")
      .field("admin_email", &self.admin_email)
      .field("from_address", &self.from_address)
      .field("resend_api_key", &(!self.resend_api_key.is_empty()).then_some("<set>"))
      .field("resend_base_url", &self.resend_base_url)
      .finish()
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("plotbook.db") }
fn default_admin_email() -> String { "admin@example.com".to_owned() }
fn default_from_address() -> String { "Plot Bookings <onboarding@resend.dev>".to_owned() }
fn default_resend_base_url() -> String { "https://api.resend.com".to_owned() }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, M>(store: Arc<S>, changes: ChangeFeed, relay: RelayState<M>) -> Router
where
  S: BookingStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  M: Mailer + 'static,
{
  Router::new()
    .nest("/api", plotbook_api::api_router(store, changes))
    .merge(relay::router(relay))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
