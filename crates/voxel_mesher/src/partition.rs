//! Block partitioning of the cell range.
//!
//! Tiles `[0, nx-1] × [0, ny-1] × [0, nz-1]` into disjoint blocks of near
//! equal size. Along an axis of `n` cells and target size `B`:
//!
//! ```text
//! count = ceil(n / B)
//! base  = n / count
//! extra = n % count        first `extra` blocks get base + 1 cells
//!
//! n = 45, B = 20  →  count = 3, base = 15, extra = 0  →  15 | 15 | 15
//! n = 41, B = 20  →  count = 3, base = 13, extra = 2  →  14 | 14 | 13
//! ```

use crate::error::{MeshError, Result};

/// Inclusive cell index range processed by one worker task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block {
  /// Position in partition order (x-major, then y, then z).
  pub index: usize,
  pub min: [usize; 3],
  pub max: [usize; 3],
}

impl Block {
  pub fn new(index: usize, min: [usize; 3], max: [usize; 3]) -> Self {
    Self { index, min, max }
  }

  /// Cells along each axis.
  #[inline]
  pub fn dims(&self) -> [usize; 3] {
    [
      self.max[0] - self.min[0] + 1,
      self.max[1] - self.min[1] + 1,
      self.max[2] - self.min[2] + 1,
    ]
  }

  pub fn cell_count(&self) -> usize {
    let [x, y, z] = self.dims();
    x * y * z
  }

  #[inline]
  pub fn contains(&self, cell: [usize; 3]) -> bool {
    (0..3).all(|i| self.min[i] <= cell[i] && cell[i] <= self.max[i])
  }

  /// Fail fast when the block is malformed or exceeds `extents` cells.
  pub fn check_within(&self, extents: [usize; 3]) -> Result<()> {
    let ok = (0..3).all(|i| self.min[i] <= self.max[i] && self.max[i] < extents[i]);
    if ok {
      Ok(())
    } else {
      Err(MeshError::BlockOutOfRange {
        min: self.min,
        max: self.max,
        extents,
      })
    }
  }
}

/// Cell extents for a grid of `grid_extents` samples.
///
/// Includes the outer layer of cells that closes surfaces at the grid
/// border. An empty axis yields no cells at all.
pub fn cell_extents(grid_extents: [usize; 3]) -> [usize; 3] {
  if grid_extents.contains(&0) {
    return [0; 3];
  }
  [grid_extents[0] + 1, grid_extents[1] + 1, grid_extents[2] + 1]
}

/// Split `0..n` into inclusive spans per the near-equal rule.
pub fn axis_spans(n: usize, block_size: usize) -> Vec<(usize, usize)> {
  if n == 0 || block_size == 0 {
    return Vec::new();
  }
  let count = n.div_ceil(block_size);
  let base = n / count;
  let extra = n % count;

  let mut spans = Vec::with_capacity(count);
  let mut start = 0;
  for i in 0..count {
    let len = base + usize::from(i < extra);
    spans.push((start, start + len - 1));
    start += len;
  }
  spans
}

/// Tile `extents` cells into blocks of about `block_size` cells per side.
pub fn partition_blocks(extents: [usize; 3], block_size: usize) -> Result<Vec<Block>> {
  if block_size == 0 {
    return Err(MeshError::InvalidConfig("block size must be positive".into()));
  }

  let xs = axis_spans(extents[0], block_size);
  let ys = axis_spans(extents[1], block_size);
  let zs = axis_spans(extents[2], block_size);

  let mut blocks = Vec::with_capacity(xs.len() * ys.len() * zs.len());
  for &(x0, x1) in &xs {
    for &(y0, y1) in &ys {
      for &(z0, z1) in &zs {
        let index = blocks.len();
        blocks.push(Block::new(index, [x0, y0, z0], [x1, y1, z1]));
      }
    }
  }

  tracing::debug!(
    blocks = blocks.len(),
    ?extents,
    block_size,
    "partitioned cell range"
  );
  Ok(blocks)
}

#[cfg(test)]
#[path = "partition_test.rs"]
mod partition_test;
