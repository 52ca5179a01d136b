//! Read-only voxel grid capability consumed by the pipeline.
//!
//! The pipeline never writes to a grid. Implementations only need O(1)
//! point lookups and must be `Sync` so block workers can share one
//! reference.

use glam::Vec3;

use crate::constants::{coord_to_index, INSIDE_SAMPLE, OUTSIDE_SAMPLE};
use crate::error::{MeshError, Result};

/// World-space placement of a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridBounds {
  /// World position of the grid's minimum corner.
  pub origin: Vec3,

  /// Edge length of one voxel.
  pub voxel_size: f32,
}

impl GridBounds {
  pub fn new(origin: Vec3, voxel_size: f32) -> Self {
    Self { origin, voxel_size }
  }

  /// World position of a (possibly fractional) sample coordinate.
  ///
  /// Samples sit at voxel centers.
  #[inline]
  pub fn sample_to_world(&self, sample: Vec3) -> Vec3 {
    self.origin + (sample + Vec3::splat(0.5)) * self.voxel_size
  }

  /// Voxel containing a world position, without range checks.
  #[inline]
  pub fn world_to_voxel(&self, world: Vec3) -> [i64; 3] {
    let v = ((world - self.origin) / self.voxel_size).floor();
    [v.x as i64, v.y as i64, v.z as i64]
  }

  /// World-space maximum corner of a grid with `extents` voxels.
  pub fn world_max(&self, extents: [usize; 3]) -> Vec3 {
    self.origin
      + Vec3::new(
        extents[0] as f32,
        extents[1] as f32,
        extents[2] as f32,
      ) * self.voxel_size
  }
}

impl Default for GridBounds {
  fn default() -> Self {
    Self {
      origin: Vec3::ZERO,
      voxel_size: 1.0,
    }
  }
}

/// Dense voxel volume with O(1) lookups.
///
/// `sample` is negative inside the solid and positive outside. Boolean grids
/// only implement `state`; the provided `sample` maps it to ±1.
pub trait VoxelGrid: Sync {
  /// Number of voxels along X, Y and Z.
  fn extents(&self) -> [usize; 3];

  fn bounds(&self) -> GridBounds;

  /// Whether voxel `(x, y, z)` is inside the solid. Indices must be in range.
  fn state(&self, x: usize, y: usize, z: usize) -> bool;

  /// Scalar sample at voxel `(x, y, z)`. Indices must be in range.
  fn sample(&self, x: usize, y: usize, z: usize) -> f32 {
    if self.state(x, y, z) {
      INSIDE_SAMPLE
    } else {
      OUTSIDE_SAMPLE
    }
  }

  /// Whether the voxel containing a world position is inside the solid.
  fn is_inside_at(&self, world: Vec3) -> bool {
    let [x, y, z] = self.bounds().world_to_voxel(world);
    let [nx, ny, nz] = self.extents();
    if x < 0 || y < 0 || z < 0 || x >= nx as i64 || y >= ny as i64 || z >= nz as i64 {
      return false;
    }
    self.state(x as usize, y as usize, z as usize)
  }
}

/// In-memory grid storing one `f32` sample per voxel.
#[derive(Clone, Debug)]
pub struct DenseGrid {
  extents: [usize; 3],
  bounds: GridBounds,
  samples: Vec<f32>,
}

impl DenseGrid {
  /// Grid with every voxel outside.
  pub fn new(extents: [usize; 3], bounds: GridBounds) -> Self {
    let len = extents[0] * extents[1] * extents[2];
    Self {
      extents,
      bounds,
      samples: vec![OUTSIDE_SAMPLE; len],
    }
  }

  /// Wrap an existing sample buffer laid out Z innermost.
  pub fn from_samples(extents: [usize; 3], bounds: GridBounds, samples: Vec<f32>) -> Result<Self> {
    let expected = extents[0] * extents[1] * extents[2];
    if samples.len() != expected {
      return Err(MeshError::ExtentsMismatch {
        extents,
        expected,
        actual: samples.len(),
      });
    }
    Ok(Self {
      extents,
      bounds,
      samples,
    })
  }

  /// Fill every voxel from a function of its coordinates.
  pub fn from_fn(
    extents: [usize; 3],
    bounds: GridBounds,
    f: impl Fn(usize, usize, usize) -> f32,
  ) -> Self {
    let mut grid = Self::new(extents, bounds);
    for x in 0..extents[0] {
      for y in 0..extents[1] {
        for z in 0..extents[2] {
          let idx = coord_to_index(x, y, z, extents);
          grid.samples[idx] = f(x, y, z);
        }
      }
    }
    grid
  }

  pub fn set_sample(&mut self, x: usize, y: usize, z: usize, value: f32) {
    let idx = coord_to_index(x, y, z, self.extents);
    self.samples[idx] = value;
  }

  pub fn set_state(&mut self, x: usize, y: usize, z: usize, inside: bool) {
    let value = if inside { INSIDE_SAMPLE } else { OUTSIDE_SAMPLE };
    self.set_sample(x, y, z, value);
  }

  /// Set every voxel in the inclusive box `min..=max` (clamped to the grid).
  pub fn fill_box(&mut self, min: [usize; 3], max: [usize; 3], inside: bool) {
    let hi = [
      max[0].min(self.extents[0].saturating_sub(1)),
      max[1].min(self.extents[1].saturating_sub(1)),
      max[2].min(self.extents[2].saturating_sub(1)),
    ];
    if self.samples.is_empty() {
      return;
    }
    for x in min[0]..=hi[0] {
      for y in min[1]..=hi[1] {
        for z in min[2]..=hi[2] {
          self.set_state(x, y, z, inside);
        }
      }
    }
  }

  /// Number of voxels classified inside.
  pub fn inside_count(&self) -> usize {
    self.samples.iter().filter(|&&v| v < 0.0).count()
  }

  pub fn samples(&self) -> &[f32] {
    &self.samples
  }
}

impl VoxelGrid for DenseGrid {
  fn extents(&self) -> [usize; 3] {
    self.extents
  }

  fn bounds(&self) -> GridBounds {
    self.bounds
  }

  #[inline]
  fn state(&self, x: usize, y: usize, z: usize) -> bool {
    self.sample(x, y, z) < 0.0
  }

  #[inline]
  fn sample(&self, x: usize, y: usize, z: usize) -> f32 {
    self.samples[coord_to_index(x, y, z, self.extents)]
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
