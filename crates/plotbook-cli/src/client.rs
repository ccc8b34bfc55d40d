//! Async HTTP client for the plotbook API and notification relay.
//!
//! [`ApiClient`] implements [`BookingStore`] and [`Notifier`], so the sync
//! and submission logic from `plotbook-core` drives the remote server
//! directly.

use std::time::Duration;

use chrono::{DateTime, Utc};
use plotbook_core::{
  booking::{Booking, NewBooking, StoredDocument},
  change::ChangeEvent,
  notification::BookingNotification,
  store::{BookingStore, Notifier},
};
use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

/// Connection settings for the plotbook server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:  String,
  /// Full URL of the notification relay endpoint.
  pub relay_url: String,
}

impl ApiConfig {
  /// Settings for a server that also hosts the relay at `/notify-booking`.
  pub fn for_server(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into();
    let relay_url = format!("{}/notify-booking", base_url.trim_end_matches('/'));
    Self { base_url, relay_url }
  }
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("{method} {path} → {status}: {message}")]
  Status {
    method:  &'static str,
    path:    String,
    status:  StatusCode,
    message: String,
  },
}

/// Body of an error response: `{"error": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the plotbook REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`]s are `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  /// No overall timeout: the change feed stays open indefinitely.
  stream: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    let stream = Client::builder()
      .connect_timeout(Duration::from_secs(10))
      .build()?;
    Ok(Self { client, stream, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Change feed ───────────────────────────────────────────────────────────

  /// `GET /api/changes`: forward every change event to `tx` until the
  /// stream ends, the connection fails, or the receiver is dropped.
  pub async fn watch_changes(
    &self,
    tx: &mpsc::Sender<ChangeEvent>,
  ) -> Result<(), ClientError> {
    let resp = self
      .stream
      .get(self.url("/changes"))
      .header(header::ACCEPT, "text/event-stream")
      .send()
      .await?;
    let mut resp = check("GET", "/changes", resp).await?;
    tracing::info!("subscribed to change feed");

    let mut parser = SseParser::default();
    while let Some(chunk) = resp.chunk().await? {
      for event in parser.push(&chunk) {
        if event.event.as_deref().is_some_and(|name| name != "change") {
          continue;
        }
        match serde_json::from_str::<ChangeEvent>(&event.data) {
          Ok(change) => {
            if tx.send(change).await.is_err() {
              return Ok(());
            }
          }
          Err(e) => tracing::warn!(error = %e, data = %event.data, "ignoring malformed change event"),
        }
      }
    }
    Ok(())
  }

  /// Keep a change-feed subscription open, reconnecting `retry` after each
  /// failure, until `tx` is closed. Every reconnect is preceded by a
  /// `resync` event, since changes may have been missed while disconnected.
  pub async fn follow_changes(&self, tx: mpsc::Sender<ChangeEvent>, retry: Duration) {
    let mut reconnecting = false;
    while !tx.is_closed() {
      if reconnecting && tx.send(ChangeEvent::resync()).await.is_err() {
        break;
      }
      match self.watch_changes(&tx).await {
        Ok(()) => tracing::info!("change feed closed"),
        Err(e) => tracing::warn!(error = %e, "change feed failed"),
      }
      reconnecting = true;
      tokio::time::sleep(retry).await;
    }
  }
}

/// Turn a non-2xx response into [`ClientError::Status`], using the server's
/// `{"error"}` message when there is one.
async fn check(
  method: &'static str,
  path: &str,
  resp: Response,
) -> Result<Response, ClientError> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let text = resp.text().await.unwrap_or_default();
  let message = serde_json::from_str::<ErrorBody>(&text)
    .map(|b| b.error)
    .unwrap_or(text);
  Err(ClientError::Status {
    method,
    path: path.to_owned(),
    status,
    message,
  })
}

// ─── BookingStore ─────────────────────────────────────────────────────────────

impl BookingStore for ApiClient {
  type Error = ClientError;

  /// `GET /api/bookings`
  async fn list_bookings(&self) -> Result<Vec<Booking>, ClientError> {
    let resp = self.client.get(self.url("/bookings")).send().await?;
    Ok(check("GET", "/bookings", resp).await?.json().await?)
  }

  /// `POST /api/bookings`
  async fn insert_booking(&self, input: NewBooking) -> Result<Booking, ClientError> {
    let resp = self
      .client
      .post(self.url("/bookings"))
      .json(&input)
      .send()
      .await?;
    Ok(check("POST", "/bookings", resp).await?.json().await?)
  }

  /// `PUT /api/documents/{key}`. A 409 means the key is already taken.
  async fn put_document(
    &self,
    key: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
  ) -> Result<bool, ClientError> {
    let path = format!("/documents/{key}");
    let mut req = self.client.put(self.url(&path)).body(bytes);
    if let Some(ct) = content_type {
      req = req.header(header::CONTENT_TYPE, ct);
    }
    let resp = req.send().await?;
    if resp.status() == StatusCode::CONFLICT {
      return Ok(false);
    }
    check("PUT", &path, resp).await?;
    Ok(true)
  }

  /// `GET /api/documents/{key}`
  async fn get_document(&self, key: String) -> Result<Option<StoredDocument>, ClientError> {
    let path = format!("/documents/{key}");
    let resp = self.client.get(self.url(&path)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let resp = check("GET", &path, resp).await?;

    let headers = resp.headers();
    let content_type = headers
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);
    let uploaded_at = headers
      .get(header::LAST_MODIFIED)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
      .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));
    let bytes = resp.bytes().await?.to_vec();

    Ok(Some(StoredDocument {
      key,
      content_type,
      bytes,
      uploaded_at,
    }))
  }
}

// ─── Notifier ─────────────────────────────────────────────────────────────────

impl Notifier for ApiClient {
  type Error = ClientError;

  /// `POST {relay_url}`
  async fn notify(&self, notification: &BookingNotification) -> Result<(), ClientError> {
    let resp = self
      .client
      .post(&self.config.relay_url)
      .json(notification)
      .send()
      .await?;
    check("POST", "/notify-booking", resp).await?;
    Ok(())
  }
}

// ─── SSE parsing ──────────────────────────────────────────────────────────────

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
  pub event: Option<String>,
  pub data:  String,
}

/// Incremental `text/event-stream` parser. Chunks may split lines (and
/// UTF-8 sequences) anywhere.
#[derive(Debug, Default)]
pub struct SseParser {
  buf:   Vec<u8>,
  event: Option<String>,
  data:  Vec<String>,
}

impl SseParser {
  /// Feed a chunk; returns every event completed by it.
  pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
    self.buf.extend_from_slice(chunk);
    let mut out = Vec::new();

    while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
      let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
      line.pop();
      if line.last() == Some(&b'\r') {
        line.pop();
      }
      let line = String::from_utf8_lossy(&line);

      if line.is_empty() {
        if !self.data.is_empty() {
          out.push(SseEvent {
            event: self.event.take(),
            data:  self.data.join("\n"),
          });
          self.data.clear();
        }
        self.event = None;
        continue;
      }
      if line.starts_with(':') {
        continue;
      }

      let (field, value) = match line.split_once(':') {
        Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
        None => (line.as_ref(), ""),
      };
      match field {
        "event" => self.event = Some(value.to_owned()),
        "data" => self.data.push(value.to_owned()),
        _ => {}
      }
    }
    out
  }
}
