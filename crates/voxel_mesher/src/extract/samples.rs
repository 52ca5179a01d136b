//! Per-block sample buffers with optional Gaussian smoothing.
//!
//! A block covering cells `min..=max` reads lattice samples
//! `min-1 ..= max` on each axis, plus an apron of `r` samples for a
//! smoothing kernel of radius `r`:
//!
//! ```text
//!   lattice:  min-1-r ... min-1 | min ... max | max+1 ... max+r
//!             └── apron ──┘      └ used by cells ┘  └── apron ──┘
//! ```
//!
//! The apron makes every smoothed value the cells read depend only on
//! samples inside the buffer, so neighbouring blocks compute identical
//! values on their shared sample planes.

use crate::constants::{coord_to_index, OUTSIDE_SAMPLE};
use crate::grid::VoxelGrid;
use crate::partition::Block;

/// Normalized 1D Gaussian kernel for a smoothing width, `None` when `width`
/// disables smoothing.
///
/// Radius is `ceil(2 * width)`; weights are `exp(-x² / 2w²)`.
pub fn gaussian_kernel(width: f32) -> Option<Vec<f32>> {
  if !(width > 0.0) || !width.is_finite() {
    return None;
  }
  let radius = (2.0 * width).ceil() as i32;
  let denom = 2.0 * width * width;
  let mut kernel: Vec<f32> = (-radius..=radius)
    .map(|x| (-((x * x) as f32) / denom).exp())
    .collect();
  let sum: f32 = kernel.iter().sum();
  for w in &mut kernel {
    *w /= sum;
  }
  Some(kernel)
}

/// Samples `(value - isovalue)` for one block, on the padded lattice.
pub(crate) struct BlockSamples {
  /// Lattice coordinate of buffer element `[0, 0, 0]`.
  origin: [i64; 3],
  dims: [usize; 3],
  values: Vec<f32>,
}

impl BlockSamples {
  /// Load the samples `block` reads, with `apron` extra samples per side.
  pub fn load<G: VoxelGrid + ?Sized>(grid: &G, block: &Block, apron: usize, isovalue: f32) -> Self {
    let apron = apron as i64;
    let origin = [
      block.min[0] as i64 - 1 - apron,
      block.min[1] as i64 - 1 - apron,
      block.min[2] as i64 - 1 - apron,
    ];
    let dims = [
      block.max[0] - block.min[0] + 2 + 2 * apron as usize,
      block.max[1] - block.min[1] + 2 + 2 * apron as usize,
      block.max[2] - block.min[2] + 2 + 2 * apron as usize,
    ];

    let extents = grid.extents();
    let on_grid = |p: i64, axis: usize| p >= 0 && p < extents[axis] as i64;

    let mut values = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
    for x in origin[0]..origin[0] + dims[0] as i64 {
      for y in origin[1]..origin[1] + dims[1] as i64 {
        for z in origin[2]..origin[2] + dims[2] as i64 {
          // Off-grid lattice samples stay outside whatever the isovalue.
          let v = if on_grid(x, 0) && on_grid(y, 1) && on_grid(z, 2) {
            grid.sample(x as usize, y as usize, z as usize) - isovalue
          } else {
            OUTSIDE_SAMPLE
          };
          values.push(v);
        }
      }
    }

    Self {
      origin,
      dims,
      values,
    }
  }

  /// Whether any sample lies inside and any outside after the epsilon shift.
  pub fn has_sign_change(&self, epsilon: f32) -> bool {
    let mut inside = false;
    let mut outside = false;
    for &v in &self.values {
      if v <= -epsilon {
        inside = true;
      } else {
        outside = true;
      }
      if inside && outside {
        return true;
      }
    }
    false
  }

  /// Separable convolution along X, then Y, then Z.
  pub fn smooth(&mut self, kernel: &[f32]) {
    let mut scratch = vec![0.0f32; self.values.len()];
    for axis in 0..3 {
      convolve_axis(&self.values, &mut scratch, self.dims, axis, kernel);
      std::mem::swap(&mut self.values, &mut scratch);
    }
  }

  /// Shift values within `epsilon` of zero to `+epsilon`.
  pub fn nudge(&mut self, epsilon: f32) {
    for v in &mut self.values {
      if v.abs() < epsilon {
        *v = epsilon;
      }
    }
  }

  /// Value at a lattice coordinate covered by this buffer.
  #[inline]
  pub fn get(&self, p: [i64; 3]) -> f32 {
    let x = (p[0] - self.origin[0]) as usize;
    let y = (p[1] - self.origin[1]) as usize;
    let z = (p[2] - self.origin[2]) as usize;
    self.values[coord_to_index(x, y, z, self.dims)]
  }
}

/// Gather-convolve `src` into `dst` along one axis.
///
/// Kernel taps falling off the buffer are skipped; those positions lie in
/// the apron and are never read by cells.
fn convolve_axis(src: &[f32], dst: &mut [f32], dims: [usize; 3], axis: usize, kernel: &[f32]) {
  let radius = (kernel.len() / 2) as i64;
  let len = dims[axis] as i64;
  for x in 0..dims[0] {
    for y in 0..dims[1] {
      for z in 0..dims[2] {
        let mut p = [x, y, z];
        let center = p[axis] as i64;
        let mut sum = 0.0f32;
        for (k, &w) in kernel.iter().enumerate() {
          let q = center + k as i64 - radius;
          if q < 0 || q >= len {
            continue;
          }
          p[axis] = q as usize;
          sum += w * src[coord_to_index(p[0], p[1], p[2], dims)];
        }
        dst[coord_to_index(x, y, z, dims)] = sum;
      }
    }
  }
}
