//! The booking change feed: `GET /changes` as server-sent events.
//!
//! Every write that goes through the API publishes a [`ChangeEvent`] on a
//! broadcast channel; each SSE subscriber gets its own receiver. A subscriber
//! that falls behind receives a single resync event instead of the missed
//! ones, since clients re-fetch everything on any event anyway.

use std::time::Duration;

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use plotbook_core::{change::ChangeEvent, store::BookingStore};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::ApiState;

const CHANNEL_CAPACITY: usize = 64;

/// SSE event name used for every change.
pub const EVENT_NAME: &str = "change";

/// Fan-out handle for change events. Cheap to clone.
#[derive(Clone)]
pub struct ChangeFeed {
  tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
  fn default() -> Self {
    let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
    Self { tx }
  }
}

impl ChangeFeed {
  /// Send `event` to every current subscriber. Having none is not an error.
  pub fn publish(&self, event: ChangeEvent) {
    let receivers = self.tx.send(event).unwrap_or(0);
    tracing::debug!(receivers, "change published");
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> { self.tx.subscribe() }

  pub fn subscriber_count(&self) -> usize { self.tx.receiver_count() }
}

/// `GET /changes`
pub async fn stream<S>(
  State(state): State<ApiState<S>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
  S: BookingStore,
{
  let rx = state.changes.subscribe();
  tracing::debug!("change feed subscriber connected");

  let events = futures::stream::unfold(rx, |mut rx| async move {
    let change = match rx.recv().await {
      Ok(change) => change,
      Err(RecvError::Lagged(missed)) => {
        tracing::warn!(missed, "change feed subscriber lagged");
        ChangeEvent::resync()
      }
      Err(RecvError::Closed) => return None,
    };
    let event = Event::default().event(EVENT_NAME).json_data(&change);
    Some((event, rx))
  });

  Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
