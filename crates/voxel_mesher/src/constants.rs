//! Lattice layout constants and pipeline defaults.
//!
//! # Sample Lattice
//!
//! A grid with `n` samples along an axis is read through a padded lattice
//! that adds one virtual "outside" sample on each side. Cells sit between
//! lattice samples, so there are `n + 1` cells per axis and every solid is
//! closed at the grid border.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         PADDED SAMPLE LATTICE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Lattice index:  -1     0     1    ...   n-2   n-1     n                │
//! │                   │     │     │           │     │      │                │
//! │                   │     └──── grid samples ─────┘      │                │
//! │                   └─ virtual outside         virtual ──┘                │
//! │                                                                         │
//! │  Cell index:        0     1    ...              n                       │
//! │  Cell c spans lattice samples c-1 and c                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sample `s` sits at world position `origin + (s + 0.5) * voxel_size`
//! (the voxel center).
//!
//! # Memory Layout
//!
//! ```text
//! Dense sample buffers are row-major, Z innermost:
//!
//! index = (x * ny + y) * nz + z
//! ```
//!
//! # Corner Layout
//!
//! ```text
//!         4──────5          +Y
//!        /│     /│           │
//!       7─┼────6 │           │
//!       │ 0────┼─1           └───── +X
//!       │/     │/           /
//!       3──────2           +Z
//!
//!   0 = (0,0,0)  1 = (1,0,0)  2 = (1,0,1)  3 = (0,0,1)
//!   4 = (0,1,0)  5 = (1,1,0)  6 = (1,1,1)  7 = (0,1,1)
//! ```

/// Sample value assigned to voxels classified inside the solid.
pub const INSIDE_SAMPLE: f32 = -1.0;

/// Sample value assigned to voxels outside the solid and to the virtual
/// padding layer around the grid.
pub const OUTSIDE_SAMPLE: f32 = 1.0;

/// Values within this distance of the isovalue are shifted to `+ISO_EPSILON`
/// before interpolation.
pub const ISO_EPSILON: f32 = 1e-2;

/// Default block edge length in cells.
pub const DEFAULT_BLOCK_SIZE: usize = 20;

/// Block meshes with at most this many faces skip decimation.
pub const NO_DECIMATION_SIZE: usize = 100;

/// Default cap on decimation passes per block.
pub const MAX_DECIMATION_PASSES: usize = 7;

/// Shell counts above this run volume evaluation on the worker pool.
pub const PARALLEL_SHELL_THRESHOLD: usize = 5;

/// Number of error-bound relaxations tried when over the triangle budget.
pub const BUDGET_RELAXATION_ATTEMPTS: usize = 3;

/// Error-bound multiplier applied on each budget relaxation.
pub const BUDGET_RELAXATION_FACTOR: f32 = 10.0;

/// Corner offsets of a cell, in lattice steps from its lowest corner.
pub const CORNER_OFFSETS: [[i64; 3]; 8] = [
  [0, 0, 0], // 0
  [1, 0, 0], // 1
  [1, 0, 1], // 2
  [0, 0, 1], // 3
  [0, 1, 0], // 4
  [1, 1, 0], // 5
  [1, 1, 1], // 6
  [0, 1, 1], // 7
];

/// Convert 3D coordinates to a linear index in a dense buffer of `dims`.
#[inline(always)]
pub const fn coord_to_index(x: usize, y: usize, z: usize, dims: [usize; 3]) -> usize {
  (x * dims[1] + y) * dims[2] + z
}

/// Convert a linear index back to 3D coordinates in a buffer of `dims`.
#[inline(always)]
pub const fn index_to_coord(idx: usize, dims: [usize; 3]) -> (usize, usize, usize) {
  let z = idx % dims[2];
  let y = (idx / dims[2]) % dims[1];
  let x = idx / (dims[1] * dims[2]);
  (x, y, z)
}

/// Global id of a padded-lattice sample, unique for a grid of `extents`.
///
/// Lattice coordinates range over `-1..=n` per axis.
#[inline]
pub fn lattice_id(p: [i64; 3], extents: [usize; 3]) -> u64 {
  let ny = extents[1] as u64 + 2;
  let nz = extents[2] as u64 + 2;
  let x = (p[0] + 1) as u64;
  let y = (p[1] + 1) as u64;
  let z = (p[2] + 1) as u64;
  (x * ny + y) * nz + z
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
