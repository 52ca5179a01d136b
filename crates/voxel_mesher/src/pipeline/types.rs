//! Pipeline I/O types.
//!
//! ```text
//!                        VOXEL MESHING PIPELINE
//!                        ======================
//!
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ STAGE 1: PARTITION                                                          │
//! │ Input:  grid cell extents, block size                                       │
//! │ Output: Vec<Block> (x-major order)                                          │
//! └────────────────────────┬────────────────────────────────────────────────────┘
//!                          │ Block[]
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ STAGE 2: BLOCKS (worker pool)                                               │
//! │ Input:  &VoxelGrid + Block                                                  │
//! │ Output: BlockMesh { mesh, vertex_keys }                                     │
//! │                                                                             │
//! │ extract_block() → decimate() when faces > no_decimation_size                │
//! │ A failing block is logged and dropped.                                      │
//! └────────────────────────┬────────────────────────────────────────────────────┘
//!                          │ BlockMesh[] (block order)
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ STAGE 3: BUDGET (only when max_triangles > 0)                               │
//! │ Re-decimate with error × 10, up to 3 times, until under budget              │
//! └────────────────────────┬────────────────────────────────────────────────────┘
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ STAGE 4: ASSEMBLE                                                           │
//! │ Concatenate in block order, weld seam vertices by VertexKey                 │
//! │ Optionally decimate the welded mesh once more (seam_decimation)             │
//! └────────────────────────┬────────────────────────────────────────────────────┘
//!                          │ Mesh
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ STAGE 5: SHELLS (only with a ShellFilter)                                   │
//! │ Keep the largest shells above the minimum volume                            │
//! └────────────────────────┬────────────────────────────────────────────────────┘
//!                          ▼
//!                   PipelineOutput { mesh, stats, shells }
//! ```

use crate::decimate::DecimationStats;
use crate::shells::Shell;
use crate::types::{Mesh, TriangleCollector};

/// Counters and timings for one pipeline run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineStats {
  pub blocks_total: usize,

  /// Blocks that produced at least one face.
  pub blocks_processed: usize,

  /// Blocks without a surface crossing.
  pub blocks_empty: usize,

  /// Blocks whose task failed; their faces are missing from the output.
  pub blocks_dropped: usize,

  pub faces_extracted: usize,

  /// Faces after decimation and budget relaxation, before assembly.
  pub faces_decimated: usize,

  pub decimation: DecimationStats,

  /// Budget relaxation rounds that ran.
  pub relaxation_attempts: usize,

  /// Block vertices merged into an existing seam vertex.
  pub vertices_welded: usize,

  /// Faces dropped during assembly because two corners welded together.
  pub degenerate_faces: usize,

  /// Collapses made by the post-assembly seam pass.
  pub seam_collapses: usize,

  pub shells_found: usize,
  pub shells_discarded: usize,

  pub faces_final: usize,

  pub blocks_us: u64,
  pub assemble_us: u64,
  pub shells_us: u64,
  pub total_us: u64,
}

/// Final mesh plus run statistics.
#[derive(Clone, Debug, Default)]
pub struct PipelineOutput {
  pub mesh: Mesh,
  pub stats: PipelineStats,

  /// Retained shells when a shell filter ran, empty otherwise.
  pub shells: Vec<Shell>,
}

impl PipelineOutput {
  /// Send every output triangle to `collector`.
  pub fn emit<C: TriangleCollector + ?Sized>(&self, collector: &mut C) {
    self.mesh.emit(collector);
  }
}
