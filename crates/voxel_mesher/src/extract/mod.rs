//! Isosurface extraction for one block.
//!
//! # Algorithm Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    BLOCK EXTRACTION PIPELINE                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Phase 1: LOAD                                                          │
//! │  ─────────────────                                                      │
//! │  Copy lattice samples (value - isovalue) for the block plus apron.      │
//! │  No sign change anywhere → empty mesh, done.                            │
//! │                                                                         │
//! │  Phase 2: SMOOTH (optional)                                             │
//! │  ─────────────────                                                      │
//! │  Separable Gaussian along X, Y, Z.                                      │
//! │                                                                         │
//! │  Phase 3: NUDGE                                                         │
//! │  ─────────────────                                                      │
//! │  |v| < ε  →  v = +ε, so every crossed edge has a non-zero span.         │
//! │                                                                         │
//! │  Phase 4: POLYGONIZE                                                    │
//! │  ─────────────────                                                      │
//! │  Cubes: 8-bit case → TRI_TABLE triangles.                               │
//! │  Tetrahedra: 6 tets per cell, 4-bit case → TET_TRI_TABLE.               │
//! │  Crossing vertices memoized by grid-edge key.                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every vertex records the [`VertexKey`] of the grid edge it was placed on.
//! Neighbouring blocks produce the same key for vertices on their shared
//! sample plane, which is what assembly welds on.

mod cubes;
mod samples;
mod tetra;

use std::collections::HashMap;

use glam::Vec3;

pub use samples::gaussian_kernel;
use samples::BlockSamples;

use crate::constants::{lattice_id, ISO_EPSILON};
use crate::error::Result;
use crate::grid::{GridBounds, VoxelGrid};
use crate::partition::{cell_extents, Block};
use crate::types::Mesh;

/// Polygonization algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
  /// Marching cubes (up to 5 triangles per cell).
  #[default]
  Cubes,

  /// Marching tetrahedra (6 tetrahedra per cell, denser output).
  Tetrahedra,
}

/// Parameters for extracting one block.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractParams {
  pub algorithm: Algorithm,

  /// Scalar value of the surface.
  pub isovalue: f32,

  /// Samples within this distance of the isovalue are nudged outward.
  pub iso_epsilon: f32,

  /// Gaussian smoothing width in voxels; `0` disables smoothing.
  pub smoothing_width: f32,
}

impl Default for ExtractParams {
  fn default() -> Self {
    Self {
      algorithm: Algorithm::Cubes,
      isovalue: 0.0,
      iso_epsilon: ISO_EPSILON,
      smoothing_width: 0.0,
    }
  }
}

/// Identity of the grid edge a vertex was interpolated on: the sorted pair
/// of its endpoints' global lattice ids.
pub type VertexKey = (u64, u64);

/// Mesh produced for one block, with per-vertex seam keys.
#[derive(Clone, Debug)]
pub struct BlockMesh {
  pub block: Block,
  pub mesh: Mesh,

  /// Parallel to `mesh.positions`; `None` for vertices made by decimation.
  pub vertex_keys: Vec<Option<VertexKey>>,
}

impl BlockMesh {
  /// Empty result for `block`.
  pub fn empty(block: Block) -> Self {
    Self {
      block,
      mesh: Mesh::new(),
      vertex_keys: Vec::new(),
    }
  }

  pub fn triangle_count(&self) -> usize {
    self.mesh.triangle_count()
  }

  pub fn is_empty(&self) -> bool {
    self.mesh.is_empty()
  }
}

/// Polygonize the cells of `block`.
///
/// Fails fast with [`MeshError::BlockOutOfRange`](crate::MeshError) when the
/// block does not fit the grid's cell range.
pub fn extract_block<G: VoxelGrid + ?Sized>(
  grid: &G,
  block: &Block,
  params: &ExtractParams,
) -> Result<BlockMesh> {
  let extents = grid.extents();
  block.check_within(cell_extents(extents))?;

  let kernel = gaussian_kernel(params.smoothing_width);
  let apron = kernel.as_ref().map_or(0, |k| k.len() / 2);
  let mut samples = BlockSamples::load(grid, block, apron, params.isovalue);

  if !samples.has_sign_change(params.iso_epsilon) {
    return Ok(BlockMesh::empty(*block));
  }

  if let Some(kernel) = &kernel {
    samples.smooth(kernel);
  }
  samples.nudge(params.iso_epsilon);

  let mut builder = SurfaceBuilder::new(&samples, extents, grid.bounds());
  match params.algorithm {
    Algorithm::Cubes => cubes::polygonize(block, &mut builder),
    Algorithm::Tetrahedra => tetra::polygonize(block, &mut builder),
  }

  let (mesh, vertex_keys) = builder.finish();
  tracing::trace!(
    block = block.index,
    triangles = mesh.triangle_count(),
    vertices = mesh.vertex_count(),
    "extracted block"
  );

  Ok(BlockMesh {
    block: *block,
    mesh,
    vertex_keys,
  })
}

/// Incremental indexed-mesh builder with grid-edge vertex memoization.
pub(crate) struct SurfaceBuilder<'a> {
  samples: &'a BlockSamples,
  extents: [usize; 3],
  bounds: GridBounds,
  mesh: Mesh,
  keys: Vec<Option<VertexKey>>,
  memo: HashMap<VertexKey, u32>,
}

impl<'a> SurfaceBuilder<'a> {
  fn new(samples: &'a BlockSamples, extents: [usize; 3], bounds: GridBounds) -> Self {
    Self {
      samples,
      extents,
      bounds,
      mesh: Mesh::new(),
      keys: Vec::new(),
      memo: HashMap::new(),
    }
  }

  /// Nudged sample at a lattice coordinate.
  #[inline]
  pub fn value(&self, p: [i64; 3]) -> f32 {
    self.samples.get(p)
  }

  /// Vertex where the surface crosses the lattice edge `a`-`b`.
  ///
  /// Endpoints are ordered by lattice id before interpolating, so the same
  /// edge always yields the same position.
  pub fn edge_vertex(&mut self, a: [i64; 3], b: [i64; 3]) -> u32 {
    let (ia, ib) = (lattice_id(a, self.extents), lattice_id(b, self.extents));
    let (a, b, key) = if ia <= ib {
      (a, b, (ia, ib))
    } else {
      (b, a, (ib, ia))
    };
    if let Some(&index) = self.memo.get(&key) {
      return index;
    }

    let va = self.samples.get(a);
    let vb = self.samples.get(b);
    let t = va / (va - vb);
    let pa = Vec3::new(a[0] as f32, a[1] as f32, a[2] as f32);
    let pb = Vec3::new(b[0] as f32, b[1] as f32, b[2] as f32);
    let position = self.bounds.sample_to_world(pa + (pb - pa) * t);

    let index = self.mesh.add_vertex(position);
    self.keys.push(Some(key));
    self.memo.insert(key, index);
    index
  }

  #[inline]
  pub fn position(&self, index: u32) -> Vec3 {
    self.mesh.positions[index as usize]
  }

  #[inline]
  pub fn add_triangle(&mut self, face: [u32; 3]) {
    self.mesh.add_face(face);
  }

  fn finish(self) -> (Mesh, Vec<Option<VertexKey>>) {
    (self.mesh, self.keys)
  }
}

/// Lattice coordinates of the 8 corners of cell `(cx, cy, cz)`.
#[inline]
pub(crate) fn cell_corners(cx: usize, cy: usize, cz: usize) -> [[i64; 3]; 8] {
  let base = [cx as i64 - 1, cy as i64 - 1, cz as i64 - 1];
  crate::constants::CORNER_OFFSETS.map(|o| [base[0] + o[0], base[1] + o[1], base[2] + o[2]])
}
