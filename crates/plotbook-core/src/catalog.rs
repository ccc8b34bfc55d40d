//! The static plot catalog.
//!
//! Plots are generated once per block when the catalog is built and are never
//! deleted. Their status is overlaid later by the projection.

use serde::{Deserialize, Serialize};

use crate::plot::{Block, Plot, PlotId};

/// Default nominal plot size, in square yards.
pub const DEFAULT_PLOT_SIZE: u32 = 100;

/// How many plots a block holds and how large they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
  pub block: Block,
  pub count: u32,
  #[serde(default = "default_size")]
  pub size:  u32,
}

fn default_size() -> u32 { DEFAULT_PLOT_SIZE }

/// Catalog shape; blocks are generated in the listed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
  pub blocks: Vec<BlockSpec>,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      blocks: vec![
        BlockSpec { block: Block::A, count: 125, size: DEFAULT_PLOT_SIZE },
        BlockSpec { block: Block::B, count: 231, size: DEFAULT_PLOT_SIZE },
        BlockSpec { block: Block::C, count: 231, size: DEFAULT_PLOT_SIZE },
      ],
    }
  }
}

/// Generate every plot of every configured block, all `Available`, numbered
/// from 1 within each block.
pub fn build_catalog(config: &CatalogConfig) -> Vec<Plot> {
  config
    .blocks
    .iter()
    .flat_map(|spec| {
      (1..=spec.count)
        .map(move |n| Plot::available(PlotId::new(spec.block, n), spec.size))
    })
    .collect()
}

/// The plots of `block`, in catalog order.
pub fn plots_in_block(plots: &[Plot], block: Block) -> Vec<&Plot> {
  plots.iter().filter(|p| p.block() == block).collect()
}
