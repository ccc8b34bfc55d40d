//! Plot identity and the overlaid availability status.
//!
//! A plot is identified by its block and its number within the block. Its
//! status is never stored: it is recomputed from booking records every time
//! the projection is refreshed (see [`crate::projection`]).

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::{Error, Result};

// ─── Block ───────────────────────────────────────────────────────────────────

/// One of the three fixed land subdivisions.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  EnumIter,
  IntoStaticStr,
)]
pub enum Block {
  A,
  B,
  C,
}

impl Block {
  pub fn as_str(self) -> &'static str { self.into() }
}

impl fmt::Display for Block {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Block {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim() {
      "A" | "a" => Ok(Self::A),
      "B" | "b" => Ok(Self::B),
      "C" | "c" => Ok(Self::C),
      other => Err(Error::UnknownBlock(other.to_owned())),
    }
  }
}

// ─── PlotId ──────────────────────────────────────────────────────────────────

/// A plot within a block. Rendered and stored as `"{block}-{number}"`, e.g. `A-1`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct PlotId {
  pub block:  Block,
  pub number: u32,
}

impl PlotId {
  pub fn new(block: Block, number: u32) -> Self { Self { block, number } }
}

impl fmt::Display for PlotId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.block, self.number)
  }
}

impl FromStr for PlotId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidPlotId(s.to_owned());
    let (block, number) = s.split_once('-').ok_or_else(invalid)?;
    let block = block.parse::<Block>().map_err(|_| invalid())?;
    let number = number.parse::<u32>().map_err(|_| invalid())?;
    if number == 0 {
      return Err(invalid());
    }
    Ok(Self { block, number })
  }
}

impl From<PlotId> for String {
  fn from(id: PlotId) -> Self { id.to_string() }
}

impl TryFrom<String> for PlotId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlotStatus {
  #[default]
  Available,
  Booked,
}

impl fmt::Display for PlotStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Available => "Available",
      Self::Booked => "Booked",
    })
  }
}

/// Booking metadata carried by a booked plot in the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
  pub booked_by: String,
  pub booked_at: DateTime<Utc>,
}

// ─── Plot ────────────────────────────────────────────────────────────────────

/// A bookable unit of land, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
  pub id:           PlotId,
  /// Nominal size in square yards.
  pub size:         u32,
  pub status:       PlotStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub booking_info: Option<BookingInfo>,
}

impl Plot {
  /// An available plot with no booking metadata.
  pub fn available(id: PlotId, size: u32) -> Self {
    Self {
      id,
      size,
      status: PlotStatus::Available,
      booking_info: None,
    }
  }

  pub fn block(&self) -> Block { self.id.block }

  pub fn number(&self) -> u32 { self.id.number }

  pub fn is_available(&self) -> bool { self.status == PlotStatus::Available }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plot_id_round_trips_through_text() {
    let id: PlotId = "B-231".parse().unwrap();
    assert_eq!(id, PlotId::new(Block::B, 231));
    assert_eq!(id.to_string(), "B-231");
  }

  #[test]
  fn plot_id_rejects_malformed_input() {
    for bad in ["", "A", "A-", "D-1", "A-0", "A-x", "A1"] {
      assert!(bad.parse::<PlotId>().is_err(), "{bad:?} should not parse");
    }
  }

  #[test]
  fn plot_serialises_with_string_id_and_camel_case_info() {
    let plot = Plot::available(PlotId::new(Block::A, 1), 100);
    let json = serde_json::to_value(&plot).unwrap();
    assert_eq!(json["id"], "A-1");
    assert_eq!(json["status"], "Available");
    assert!(json.get("bookingInfo").is_none());
  }
}
