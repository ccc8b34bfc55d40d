//! Payload exchanged with the notification relay.
//!
//! The relay is a boundary: it trusts nothing beyond the JSON shape, so plot
//! identity travels as plain strings here rather than as [`crate::plot::PlotId`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{booking::Booking, plot::Plot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotSummary {
  pub id:     String,
  pub block:  String,
  pub number: u32,
  pub size:   u32,
}

impl From<&Plot> for PlotSummary {
  fn from(plot: &Plot) -> Self {
    Self {
      id:     plot.id.to_string(),
      block:  plot.block().to_string(),
      number: plot.number(),
      size:   plot.size,
    }
  }
}

/// The booking as echoed to the relay, including its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetails {
  pub id:           i64,
  pub plot_id:      String,
  pub block_id:     String,
  pub plot_number:  u32,
  pub booked_by:    String,
  #[serde(default)]
  pub contact_info: Option<String>,
  #[serde(default)]
  pub phone:        Option<String>,
  #[serde(default)]
  pub visit_date:   Option<NaiveDate>,
  #[serde(default)]
  pub note:         Option<String>,
  #[serde(default)]
  pub booked_at:    Option<DateTime<Utc>>,
}

impl From<&Booking> for BookingDetails {
  fn from(b: &Booking) -> Self {
    Self {
      id:           b.id,
      plot_id:      b.plot_id.clone(),
      block_id:     b.block_id.clone(),
      plot_number:  b.plot_number,
      booked_by:    b.booked_by.clone(),
      contact_info: b.contact_info.clone(),
      phone:        b.phone.clone(),
      visit_date:   b.visit_date,
      note:         b.note.clone(),
      booked_at:    Some(b.booked_at),
    }
  }
}

/// JSON body of `POST /notify-booking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingNotification {
  pub plot:         PlotSummary,
  pub booking:      BookingDetails,
  #[serde(default)]
  pub has_document: bool,
}

impl BookingNotification {
  pub fn new(plot: &Plot, booking: &Booking, has_document: bool) -> Self {
    Self {
      plot: plot.into(),
      booking: booking.into(),
      has_document,
    }
  }
}
