//! Stage 2: per-block extraction and decimation on the worker pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ Block Stage                                                             │
//! │                                                                         │
//! │  Block ──► extract_block(grid, block, params)                           │
//! │                 │                                                       │
//! │                 ▼  faces > no_decimation_size ?                         │
//! │            WingedEdgeMesh::from_parts → decimate → to_parts             │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │            BlockMesh { block, mesh, vertex_keys }                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! After assembly, [`decimate_seams`] can run one more decimation over the
//! welded mesh.
//!
//! Blocks share nothing but the read-only grid. Each worker owns the
//! buffers of the block it is processing.

use crate::config::MeshingConfig;
use crate::decimate::{decimate, DecimationStats, GridGuard, WingedEdgeMesh};
use crate::error::Result;
use crate::extract::{extract_block, BlockMesh};
use crate::grid::VoxelGrid;
use crate::partition::Block;
use crate::threading::WorkerPool;
use crate::types::Mesh;

/// Results of running every block through the pool.
#[derive(Debug, Default)]
pub struct BlockRun {
  /// Non-empty block meshes in partition order.
  pub meshes: Vec<BlockMesh>,
  pub empty: usize,
  pub dropped: usize,
  pub faces_extracted: usize,
  pub decimation: DecimationStats,
}

impl BlockRun {
  pub fn face_count(&self) -> usize {
    self.meshes.iter().map(BlockMesh::triangle_count).sum()
  }
}

/// Extract and decimate every block of `blocks` on `pool`.
///
/// A block whose task errors or panics is logged and dropped; the run
/// continues with the remaining blocks.
pub fn run_blocks<G: VoxelGrid + ?Sized>(
  grid: &G,
  blocks: &[Block],
  config: &MeshingConfig,
  pool: &WorkerPool,
) -> BlockRun {
  let _span = tracing::info_span!("run_blocks", blocks = blocks.len(), threads = pool.num_threads()).entered();

  let params = config.extract_params();
  let outcomes = pool.run(blocks.iter().collect(), |block: &Block| -> Result<(usize, BlockMesh, DecimationStats)> {
    let extracted = extract_block(grid, block, &params)?;
    let faces = extracted.triangle_count();
    let (mesh, stats) = decimate_block(grid, &extracted, config, 1.0)?;
    Ok((faces, mesh, stats))
  });

  let mut run = BlockRun::default();
  for outcome in outcomes {
    let block = &blocks[outcome.index];
    match outcome.result {
      Ok(Ok((faces, mesh, stats))) => {
        run.faces_extracted += faces;
        run.decimation.accumulate(&stats);
        if mesh.is_empty() {
          run.empty += 1;
        } else {
          run.meshes.push(mesh);
        }
      }
      Ok(Err(error)) => {
        tracing::warn!(block = block.index, min = ?block.min, max = ?block.max, %error, "dropping block");
        run.dropped += 1;
      }
      Err(failure) => {
        tracing::warn!(
          block = block.index,
          min = ?block.min,
          max = ?block.max,
          panic = %failure.message,
          "block worker panicked, dropping block"
        );
        run.dropped += 1;
      }
    }
  }

  tracing::debug!(
    meshes = run.meshes.len(),
    empty = run.empty,
    dropped = run.dropped,
    faces = run.face_count(),
    "blocks done"
  );
  run
}

/// Re-decimate block meshes with the error bound scaled by `relaxation`.
///
/// A block that fails here keeps its previous mesh. Returns the collapse
/// statistics of this round.
pub fn redecimate_blocks<G: VoxelGrid + ?Sized>(
  grid: &G,
  meshes: &mut [BlockMesh],
  config: &MeshingConfig,
  relaxation: f32,
  pool: &WorkerPool,
) -> DecimationStats {
  let outcomes = pool.run(meshes.iter().collect(), |mesh: &BlockMesh| {
    decimate_block(grid, mesh, config, relaxation)
  });

  let mut total = DecimationStats::default();
  let mut replaced = Vec::with_capacity(outcomes.len());
  for outcome in outcomes {
    match outcome.result {
      Ok(Ok((mesh, stats))) => {
        total.accumulate(&stats);
        replaced.push((outcome.index, mesh));
      }
      Ok(Err(error)) => {
        tracing::warn!(block = meshes[outcome.index].block.index, %error, "keeping block mesh after failed relaxation");
      }
      Err(failure) => {
        tracing::warn!(
          block = meshes[outcome.index].block.index,
          panic = %failure.message,
          "keeping block mesh after panicked relaxation"
        );
      }
    }
  }
  for (index, mesh) in replaced {
    meshes[index] = mesh;
  }
  total
}

/// Decimate one block mesh with the configured policy.
///
/// Meshes at or below the no-decimation threshold come back unchanged.
pub fn decimate_block<G: VoxelGrid + ?Sized>(
  grid: &G,
  block_mesh: &BlockMesh,
  config: &MeshingConfig,
  relaxation: f32,
) -> Result<(BlockMesh, DecimationStats)> {
  let faces = block_mesh.triangle_count();
  if faces <= config.no_decimation_size || config.decimation.max_passes == 0 {
    let stats = DecimationStats {
      faces_before: faces,
      faces_after: faces,
      ..Default::default()
    };
    return Ok((block_mesh.clone(), stats));
  }

  let mut topo = WingedEdgeMesh::from_parts(&block_mesh.mesh, &block_mesh.vertex_keys)?;
  let stats = decimate_with_config(grid, &mut topo, config, relaxation);
  let (mesh, vertex_keys) = topo.to_parts();

  tracing::trace!(
    block = block_mesh.block.index,
    before = stats.faces_before,
    after = stats.faces_after,
    passes = stats.passes,
    "decimated block"
  );

  Ok((
    BlockMesh {
      block: block_mesh.block,
      mesh,
      vertex_keys,
    },
    stats,
  ))
}

/// Decimate the assembled mesh once more so the bands along block seams,
/// which per-block decimation leaves untouched, are simplified too.
///
/// Seam keys are dropped first, so every vertex with a closed fan may move.
/// On a topology error the mesh comes back unchanged.
pub fn decimate_seams<G: VoxelGrid + ?Sized>(
  grid: &G,
  mesh: Mesh,
  config: &MeshingConfig,
) -> (Mesh, DecimationStats) {
  let faces = mesh.triangle_count();
  let unchanged = DecimationStats {
    faces_before: faces,
    faces_after: faces,
    ..Default::default()
  };
  if faces == 0 || config.decimation.max_passes == 0 {
    return (mesh, unchanged);
  }

  let keys = vec![None; mesh.vertex_count()];
  let mut topo = match WingedEdgeMesh::from_parts(&mesh, &keys) {
    Ok(topo) => topo,
    Err(error) => {
      tracing::warn!(%error, "skipping seam decimation");
      return (mesh, unchanged);
    }
  };
  let stats = decimate_with_config(grid, &mut topo, config, 1.0);
  let (out, _) = topo.to_parts();

  tracing::debug!(
    before = stats.faces_before,
    after = stats.faces_after,
    passes = stats.passes,
    "decimated seams"
  );
  (out, stats)
}

/// Run [`decimate`] with the configured flatness policy, grid-guarded when
/// enabled.
fn decimate_with_config<G: VoxelGrid + ?Sized>(
  grid: &G,
  topo: &mut WingedEdgeMesh,
  config: &MeshingConfig,
  relaxation: f32,
) -> DecimationStats {
  let flatness = config.flatness_policy(grid.bounds().voxel_size, relaxation);
  if config.grid_guard {
    decimate(topo, &GridGuard::new(flatness, grid), &config.decimation)
  } else {
    decimate(topo, &flatness, &config.decimation)
  }
}
