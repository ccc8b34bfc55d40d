//! Error types for `plotbook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown block: {0:?}")]
  UnknownBlock(String),

  #[error("invalid plot id: {0:?}")]
  InvalidPlotId(String),

  #[error("plot id {plot_id} does not match block {block} / number {number}")]
  PlotIdMismatch {
    plot_id: String,
    block:   String,
    number:  u32,
  },

  #[error("row width for block {0} must be at least 1")]
  ZeroRowWidth(String),

  #[error("document key {0} is already taken")]
  DocumentExists(String),

  #[error("booking form is not ready to submit (current step: {0})")]
  NotReadyToSubmit(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
