//! Pipeline Orchestrator
//!
//! Runs partition → blocks → budget → assemble → shells over one grid.
//! This is the main entry point for callers.
//!
//! # Usage
//!
//! ```ignore
//! let config = MeshingConfig::default()
//!   .with_threads(4)
//!   .with_shell_filter(ShellFilter::largest());
//!
//! let output = generate_mesh(&grid, &config)?;
//! let mut triangles: Vec<[Vec3; 3]> = Vec::new();
//! output.emit(&mut triangles);
//! ```

use web_time::Instant;

use super::assemble::assemble;
use super::blocks::{decimate_seams, redecimate_blocks, run_blocks, BlockRun};
use super::types::{PipelineOutput, PipelineStats};
use crate::config::MeshingConfig;
use crate::constants::{BUDGET_RELAXATION_ATTEMPTS, BUDGET_RELAXATION_FACTOR};
use crate::error::{MeshError, Result};
use crate::grid::VoxelGrid;
use crate::partition::{cell_extents, partition_blocks};
use crate::shells::extract_shells_with;
use crate::threading::WorkerPool;
use crate::types::TriangleCollector;

/// Mesh the isosurface of `grid`.
///
/// Blocks that fail are logged and left out of the mesh; the run only
/// errors on invalid configuration or when the worker pool cannot start.
pub fn generate_mesh<G: VoxelGrid + ?Sized>(grid: &G, config: &MeshingConfig) -> Result<PipelineOutput> {
  let start = Instant::now();
  config.validate()?;
  let bounds = grid.bounds();
  if !(bounds.voxel_size > 0.0 && bounds.voxel_size.is_finite()) {
    return Err(MeshError::InvalidConfig("voxel_size must be positive and finite".into()));
  }

  let extents = grid.extents();
  let _span = tracing::info_span!("generate_mesh", ?extents, block_size = config.block_size).entered();

  let mut stats = PipelineStats::default();
  let blocks = partition_blocks(cell_extents(extents), config.block_size)?;
  stats.blocks_total = blocks.len();
  if blocks.is_empty() {
    tracing::info!(?extents, "grid has no cells, nothing to mesh");
    stats.total_us = start.elapsed().as_micros() as u64;
    return Ok(PipelineOutput {
      stats,
      ..Default::default()
    });
  }

  let pool = WorkerPool::new(config.threads)?;

  // Stage 2-3: blocks and triangle budget
  let blocks_start = Instant::now();
  let mut run = run_blocks(grid, &blocks, config, &pool);
  stats.relaxation_attempts = relax_to_budget(grid, &mut run, config, &pool);
  stats.blocks_processed = run.meshes.len();
  stats.blocks_empty = run.empty;
  stats.blocks_dropped = run.dropped;
  stats.faces_extracted = run.faces_extracted;
  stats.faces_decimated = run.face_count();
  stats.decimation = run.decimation;
  stats.decimation.faces_after = stats.faces_decimated;
  stats.blocks_us = blocks_start.elapsed().as_micros() as u64;

  // Stage 4: assemble
  let assemble_start = Instant::now();
  let assembly = assemble(&run.meshes);
  drop(run);
  stats.vertices_welded = assembly.welded;
  stats.degenerate_faces = assembly.degenerate;
  let mut mesh = assembly.mesh;
  if config.seam_decimation {
    let (decimated, seams) = decimate_seams(grid, mesh, config);
    mesh = decimated;
    stats.seam_collapses = seams.collapses;
    stats.decimation.passes += seams.passes;
    stats.decimation.collapses += seams.collapses;
    stats.decimation.rejected += seams.rejected;
  }
  stats.assemble_us = assemble_start.elapsed().as_micros() as u64;

  // Stage 5: shells
  let mut shells = Vec::new();
  if let Some(filter) = &config.shell_filter {
    let shells_start = Instant::now();
    let selected = extract_shells_with(&mesh, filter, config.shell_mode, &pool)?;
    stats.shells_found = selected.total;
    stats.shells_discarded = selected.total - selected.retained.len();
    mesh = selected.mesh;
    shells = selected.retained;
    stats.shells_us = shells_start.elapsed().as_micros() as u64;
  }

  stats.faces_final = mesh.triangle_count();
  stats.total_us = start.elapsed().as_micros() as u64;

  tracing::info!(
    blocks = stats.blocks_total,
    dropped = stats.blocks_dropped,
    faces_extracted = stats.faces_extracted,
    faces_final = stats.faces_final,
    shells = shells.len(),
    total_us = stats.total_us,
    "mesh generated"
  );

  Ok(PipelineOutput { mesh, stats, shells })
}

/// Mesh `grid` and stream the triangles into `collector`.
pub fn generate_into<G, C>(grid: &G, config: &MeshingConfig, collector: &mut C) -> Result<PipelineStats>
where
  G: VoxelGrid + ?Sized,
  C: TriangleCollector + ?Sized,
{
  let output = generate_mesh(grid, config)?;
  output.emit(collector);
  Ok(output.stats)
}

/// Re-decimate with a looser error bound until the face total fits
/// `max_triangles`. Returns the number of rounds run.
fn relax_to_budget<G: VoxelGrid + ?Sized>(
  grid: &G,
  run: &mut BlockRun,
  config: &MeshingConfig,
  pool: &WorkerPool,
) -> usize {
  if config.max_triangles == 0 || config.decimation.max_passes == 0 {
    return 0;
  }

  let mut faces = run.face_count();
  let mut attempts = 0;
  while faces > config.max_triangles && attempts < BUDGET_RELAXATION_ATTEMPTS {
    attempts += 1;
    let relaxation = BUDGET_RELAXATION_FACTOR.powi(attempts as i32);
    let round = redecimate_blocks(grid, &mut run.meshes, config, relaxation, pool);
    run.decimation.passes += round.passes;
    run.decimation.collapses += round.collapses;
    run.decimation.rejected += round.rejected;

    let after = run.face_count();
    tracing::debug!(attempt = attempts, relaxation, before = faces, after, "relaxed decimation");
    if after == faces {
      break;
    }
    faces = after;
  }

  if faces > config.max_triangles {
    tracing::warn!(
      faces,
      budget = config.max_triangles,
      attempts,
      "triangle budget not met"
    );
  }
  attempts
}

#[cfg(test)]
#[path = "process_test.rs"]
mod process_test;
