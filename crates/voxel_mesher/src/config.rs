//! MeshingConfig - run parameters for the meshing pipeline.

use crate::constants::{DEFAULT_BLOCK_SIZE, ISO_EPSILON, NO_DECIMATION_SIZE};
use crate::decimate::{DecimationParams, FlatnessPolicy};
use crate::error::{MeshError, Result};
use crate::extract::{Algorithm, ExtractParams};
use crate::shells::{ShellFilter, ShellMode};

/// Run parameters for [`generate_mesh`](crate::pipeline::generate_mesh).
///
/// Passed explicitly to every stage; nothing here is process-wide state.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshingConfig {
  /// Target block edge length in cells.
  pub block_size: usize,

  /// Worker threads; 0 uses one per core.
  pub threads: usize,

  pub algorithm: Algorithm,
  pub isovalue: f32,

  /// Samples closer than this to the isovalue are nudged outward.
  pub iso_epsilon: f32,

  /// Gaussian smoothing width in voxels; 0 disables smoothing.
  pub smoothing_width: f32,

  /// Maximum collapse error as a fraction of voxel_size².
  pub decimation_error_factor: f32,

  /// Minimum cosine between a face normal and the collapsing edge's faces.
  pub flatness_cos: f32,

  /// Longest collapsible edge, in voxels.
  pub max_edge_length_voxels: f32,

  /// Block meshes with at most this many faces skip decimation.
  pub no_decimation_size: usize,

  pub decimation: DecimationParams,

  /// Reject collapses whose inward probe leaves the grid's solid.
  pub grid_guard: bool,

  /// Decimate the welded mesh again so block seams are simplified too.
  pub seam_decimation: bool,

  /// `None` keeps every shell.
  pub shell_filter: Option<ShellFilter>,
  pub shell_mode: ShellMode,

  /// Triangle budget for the decimated mesh; 0 is unlimited.
  pub max_triangles: usize,
}

impl Default for MeshingConfig {
  fn default() -> Self {
    Self {
      block_size: DEFAULT_BLOCK_SIZE,
      threads: 0,
      algorithm: Algorithm::Cubes,
      isovalue: 0.0,
      iso_epsilon: ISO_EPSILON,
      smoothing_width: 1.0,
      decimation_error_factor: 0.1,
      flatness_cos: 0.98,
      max_edge_length_voxels: 4.0,
      no_decimation_size: NO_DECIMATION_SIZE,
      decimation: DecimationParams::default(),
      grid_guard: false,
      seam_decimation: false,
      shell_filter: None,
      shell_mode: ShellMode::Auto,
      max_triangles: 0,
    }
  }
}

impl MeshingConfig {
  pub fn with_block_size(mut self, cells: usize) -> Self {
    self.block_size = cells;
    self
  }

  pub fn with_threads(mut self, threads: usize) -> Self {
    self.threads = threads;
    self
  }

  pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
    self.algorithm = algorithm;
    self
  }

  pub fn with_isovalue(mut self, isovalue: f32) -> Self {
    self.isovalue = isovalue;
    self
  }

  pub fn with_smoothing_width(mut self, width: f32) -> Self {
    self.smoothing_width = width;
    self
  }

  pub fn with_decimation_error_factor(mut self, factor: f32) -> Self {
    self.decimation_error_factor = factor;
    self
  }

  pub fn with_decimation(mut self, params: DecimationParams) -> Self {
    self.decimation = params;
    self
  }

  /// Disable decimation entirely.
  pub fn without_decimation(mut self) -> Self {
    self.decimation.max_passes = 0;
    self
  }

  pub fn with_grid_guard(mut self, enabled: bool) -> Self {
    self.grid_guard = enabled;
    self
  }

  pub fn with_seam_decimation(mut self, enabled: bool) -> Self {
    self.seam_decimation = enabled;
    self
  }

  pub fn with_shell_filter(mut self, filter: ShellFilter) -> Self {
    self.shell_filter = Some(filter);
    self
  }

  pub fn with_shell_mode(mut self, mode: ShellMode) -> Self {
    self.shell_mode = mode;
    self
  }

  pub fn with_max_triangles(mut self, max: usize) -> Self {
    self.max_triangles = max;
    self
  }

  /// Check ranges; returns [`MeshError::InvalidConfig`] naming the field.
  pub fn validate(&self) -> Result<()> {
    fn invalid(msg: &str) -> Result<()> {
      Err(MeshError::InvalidConfig(msg.to_string()))
    }

    if self.block_size == 0 {
      return invalid("block_size must be positive");
    }
    if !self.isovalue.is_finite() {
      return invalid("isovalue must be finite");
    }
    if !(self.iso_epsilon > 0.0 && self.iso_epsilon.is_finite()) {
      return invalid("iso_epsilon must be positive and finite");
    }
    if !(self.smoothing_width >= 0.0 && self.smoothing_width.is_finite()) {
      return invalid("smoothing_width must be non-negative and finite");
    }
    if !(self.decimation_error_factor >= 0.0 && self.decimation_error_factor.is_finite()) {
      return invalid("decimation_error_factor must be non-negative and finite");
    }
    if !(-1.0..=1.0).contains(&self.flatness_cos) {
      return invalid("flatness_cos must lie in [-1, 1]");
    }
    if !(self.max_edge_length_voxels > 0.0) {
      return invalid("max_edge_length_voxels must be positive");
    }
    if let Some(filter) = &self.shell_filter {
      if filter.min_volume.is_nan() {
        return invalid("shell min_volume must not be NaN");
      }
    }
    Ok(())
  }

  /// Extraction parameters for every block.
  pub fn extract_params(&self) -> ExtractParams {
    ExtractParams {
      algorithm: self.algorithm,
      isovalue: self.isovalue,
      iso_epsilon: self.iso_epsilon,
      smoothing_width: self.smoothing_width,
    }
  }

  /// Squared-distance collapse error bound for a voxel pitch.
  pub fn max_error(&self, voxel_size: f32) -> f32 {
    self.decimation_error_factor * voxel_size * voxel_size
  }

  /// Default collapse policy for a voxel pitch, with the error bound scaled
  /// by `relaxation`.
  pub fn flatness_policy(&self, voxel_size: f32, relaxation: f32) -> FlatnessPolicy {
    FlatnessPolicy::new(
      self.flatness_cos,
      self.max_edge_length_voxels * voxel_size,
      self.max_error(voxel_size) * relaxation,
    )
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
