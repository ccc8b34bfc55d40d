//! Grid layout engine.
//!
//! Turns a flat, ordered list of plots into blocks, and each block into
//! fixed-width rows for display. Nothing here can fail: an empty filter
//! result simply produces no blocks, and the caller is expected to render an
//! explicit "no results" state.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  plot::{Block, Plot},
};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Which blocks are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockFilter {
  #[default]
  All,
  Only(Block),
}

impl BlockFilter {
  /// Filter options in display order.
  pub const OPTIONS: [BlockFilter; 4] = [
    BlockFilter::All,
    BlockFilter::Only(Block::A),
    BlockFilter::Only(Block::B),
    BlockFilter::Only(Block::C),
  ];

  pub fn matches(self, block: Block) -> bool {
    match self {
      Self::All => true,
      Self::Only(b) => b == block,
    }
  }

  /// The option after this one, wrapping around.
  pub fn next(self) -> Self {
    let idx = Self::OPTIONS.iter().position(|f| *f == self).unwrap_or(0);
    Self::OPTIONS[(idx + 1) % Self::OPTIONS.len()]
  }
}

impl fmt::Display for BlockFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str("All Blocks"),
      Self::Only(b) => write!(f, "Block {b}"),
    }
  }
}

// ─── Row widths ──────────────────────────────────────────────────────────────

/// Plots per row, per block. Presentational only; loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWidths {
  /// Width used for blocks without an explicit entry.
  #[serde(default = "default_width")]
  pub default: usize,
  #[serde(flatten)]
  pub blocks:  BTreeMap<Block, usize>,
}

fn default_width() -> usize { 12 }

impl Default for RowWidths {
  fn default() -> Self {
    Self {
      default: default_width(),
      blocks:  BTreeMap::from([(Block::A, 10)]),
    }
  }
}

impl RowWidths {
  /// Uniform width for every block.
  pub fn uniform(width: usize) -> Result<Self> {
    let widths = Self { default: width, blocks: BTreeMap::new() };
    widths.validate()?;
    Ok(widths)
  }

  /// Override the width of a single block.
  pub fn with(mut self, block: Block, width: usize) -> Result<Self> {
    if width == 0 {
      return Err(Error::ZeroRowWidth(block.to_string()));
    }
    self.blocks.insert(block, width);
    Ok(self)
  }

  pub fn width_for(&self, block: Block) -> usize {
    self.blocks.get(&block).copied().unwrap_or(self.default)
  }

  /// Reject zero widths; a width of zero cannot partition anything.
  pub fn validate(&self) -> Result<()> {
    if self.default == 0 {
      return Err(Error::ZeroRowWidth("(default)".to_owned()));
    }
    if let Some((block, _)) = self.blocks.iter().find(|(_, w)| **w == 0) {
      return Err(Error::ZeroRowWidth(block.to_string()));
    }
    Ok(())
  }
}

// ─── Partitioning ────────────────────────────────────────────────────────────

/// Keep plots matching `filter`, preserving source order.
pub fn filter_plots(plots: &[Plot], filter: BlockFilter) -> Vec<&Plot> {
  plots.iter().filter(|p| filter.matches(p.block())).collect()
}

/// Group plots by block. Blocks are emitted in first-occurrence order and
/// each block keeps its plots in input order.
pub fn group_by_block<'a>(plots: &[&'a Plot]) -> Vec<(Block, Vec<&'a Plot>)> {
  let mut groups: Vec<(Block, Vec<&'a Plot>)> = Vec::new();
  for plot in plots {
    match groups.iter_mut().find(|(b, _)| *b == plot.block()) {
      Some((_, members)) => members.push(plot),
      None => groups.push((plot.block(), vec![plot])),
    }
  }
  groups
}

/// Split `items` into consecutive runs of `width`; the last run may be
/// shorter. `width` is clamped to at least 1.
pub fn chunk_rows<T: Clone>(items: &[T], width: usize) -> Vec<Vec<T>> {
  items.chunks(width.max(1)).map(<[T]>::to_vec).collect()
}

/// One rendered block: its label and its rows of plots.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout<'a> {
  pub block: Block,
  pub rows:  Vec<Vec<&'a Plot>>,
}

impl BlockLayout<'_> {
  pub fn plot_count(&self) -> usize { self.rows.iter().map(Vec::len).sum() }
}

/// Filter, group and chunk `plots` for display.
pub fn layout<'a>(
  plots: &'a [Plot],
  filter: BlockFilter,
  widths: &RowWidths,
) -> Vec<BlockLayout<'a>> {
  let filtered = filter_plots(plots, filter);
  group_by_block(&filtered)
    .into_iter()
    .map(|(block, members)| BlockLayout {
      block,
      rows: chunk_rows(&members, widths.width_for(block)),
    })
    .collect()
}
