//! The client-side projection: catalog plots overlaid with booking status.
//!
//! The projection is never stored. It is rebuilt from the full booking list
//! on every sync, so merging is a pure function of its two inputs.

use std::collections::HashMap;

use crate::{
  booking::Booking,
  plot::{BookingInfo, Plot, PlotStatus},
};

/// Overlay `bookings` onto `catalog`.
///
/// A plot whose textual id matches a booking's `plot_id` becomes `Booked`
/// and carries that booking's submitter and timestamp. When several bookings
/// reference the same plot the first one in `bookings` wins. Every other
/// plot is `Available` with no booking metadata.
pub fn merge(catalog: &[Plot], bookings: &[Booking]) -> Vec<Plot> {
  let mut by_plot: HashMap<&str, &Booking> = HashMap::with_capacity(bookings.len());
  for booking in bookings {
    by_plot.entry(booking.plot_id.as_str()).or_insert(booking);
  }

  catalog
    .iter()
    .map(|plot| {
      let id = plot.id.to_string();
      match by_plot.get(id.as_str()) {
        Some(booking) => Plot {
          status: PlotStatus::Booked,
          booking_info: Some(BookingInfo {
            booked_by: booking.booked_by.clone(),
            booked_at: booking.booked_at,
          }),
          ..plot.clone()
        },
        None => Plot {
          status: PlotStatus::Available,
          booking_info: None,
          ..plot.clone()
        },
      }
    })
    .collect()
}

/// Count of booked plots in a projection.
pub fn booked_count(plots: &[Plot]) -> usize {
  plots.iter().filter(|p| !p.is_available()).count()
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::{
    catalog::{CatalogConfig, build_catalog},
    plot::{Block, PlotId},
  };

  fn booking(id: i64, plot_id: &str, by: &str) -> Booking {
    let plot: PlotId = plot_id.parse().unwrap();
    Booking {
      id,
      plot_id: plot_id.to_owned(),
      block_id: plot.block.to_string(),
      plot_number: plot.number,
      booked_by: by.to_owned(),
      contact_info: None,
      phone: None,
      visit_date: None,
      note: None,
      booked_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, id as u32).unwrap(),
    }
  }

  #[test]
  fn matching_booking_marks_plot_booked() {
    let catalog = vec![Plot::available(PlotId::new(Block::A, 1), 100)];
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let mut jane = booking(1, "A-1", "Jane Doe");
    jane.booked_at = t0;

    let projected = merge(&catalog, &[jane]);
    assert_eq!(projected[0].status, PlotStatus::Booked);
    assert_eq!(
      projected[0].booking_info,
      Some(BookingInfo { booked_by: "Jane Doe".into(), booked_at: t0 })
    );
  }

  #[test]
  fn unmatched_plots_stay_available() {
    let catalog = build_catalog(&CatalogConfig::default());
    let projected = merge(&catalog, &[booking(1, "B-7", "Sam")]);
    assert_eq!(booked_count(&projected), 1);
    for plot in projected.iter().filter(|p| p.id != PlotId::new(Block::B, 7)) {
      assert_eq!(plot.status, PlotStatus::Available);
      assert!(plot.booking_info.is_none());
    }
  }

  #[test]
  fn merge_is_idempotent() {
    let catalog = build_catalog(&CatalogConfig::default());
    let bookings = [booking(1, "A-3", "Ana"), booking(2, "C-200", "Ben")];
    let once = merge(&catalog, &bookings);
    let twice = merge(&once, &bookings);
    assert_eq!(once, twice);
  }

  #[test]
  fn merge_clears_bookings_that_disappeared() {
    let catalog = build_catalog(&CatalogConfig::default());
    let booked = merge(&catalog, &[booking(1, "A-3", "Ana")]);
    let cleared = merge(&booked, &[]);
    assert_eq!(cleared, catalog);
  }

  #[test]
  fn earliest_booking_wins_for_duplicate_plot() {
    let catalog = vec![Plot::available(PlotId::new(Block::B, 2), 100)];
    let projected =
      merge(&catalog, &[booking(1, "B-2", "First"), booking(2, "B-2", "Second")]);
    assert_eq!(projected[0].booking_info.as_ref().unwrap().booked_by, "First");
  }

  #[test]
  fn unknown_plot_ids_are_ignored() {
    let catalog = vec![Plot::available(PlotId::new(Block::A, 1), 100)];
    let projected = merge(&catalog, &[booking(1, "C-999", "Ghost")]);
    assert_eq!(projected, catalog);
  }
}
