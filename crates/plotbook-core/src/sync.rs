//! Keeps the client-side projection in line with the booking store.
//!
//! Every refresh fetches the complete booking list and rebuilds the
//! projection from the catalog. There is no delta application: any change
//! notification simply triggers another full refresh.

use chrono::{DateTime, Utc};

use crate::{
  booking::Booking,
  plot::{Plot, PlotId},
  projection,
  store::BookingStore,
};

/// Owner of the catalog and of the current projection.
pub struct BookingSync<S> {
  store:       S,
  catalog:     Vec<Plot>,
  plots:       Vec<Plot>,
  loading:     bool,
  last_synced: Option<DateTime<Utc>>,
}

impl<S: BookingStore> BookingSync<S> {
  /// Start with every catalog plot available; nothing is fetched yet.
  pub fn new(store: S, catalog: Vec<Plot>) -> Self {
    Self {
      store,
      plots: catalog.clone(),
      catalog,
      loading: false,
      last_synced: None,
    }
  }

  pub fn store(&self) -> &S { &self.store }

  /// The current projection.
  pub fn plots(&self) -> &[Plot] { &self.plots }

  pub fn plot(&self, id: PlotId) -> Option<&Plot> {
    self.plots.iter().find(|p| p.id == id)
  }

  pub fn is_loading(&self) -> bool { self.loading }

  /// When the projection was last rebuilt from a successful fetch.
  pub fn last_synced(&self) -> Option<DateTime<Utc>> { self.last_synced }

  /// Flag a refresh as pending so the caller can render a loading state
  /// before awaiting [`Self::refresh`].
  pub fn mark_loading(&mut self) { self.loading = true; }

  /// Rebuild the projection from an already-fetched booking list.
  pub fn apply(&mut self, bookings: &[Booking]) {
    self.plots = projection::merge(&self.catalog, bookings);
    self.last_synced = Some(Utc::now());
  }

  /// Fetch every booking and rebuild the projection.
  ///
  /// On error the previous projection is kept as-is and the error is
  /// returned for display. Returns the number of booked plots on success.
  pub async fn refresh(&mut self) -> Result<usize, S::Error> {
    self.loading = true;
    let result = self.store.list_bookings().await;
    self.loading = false;
    let bookings = result?;
    self.apply(&bookings);
    Ok(projection::booked_count(&self.plots))
  }
}
