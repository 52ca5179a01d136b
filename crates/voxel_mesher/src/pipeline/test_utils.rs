//! Test utilities shared by the pipeline stage tests.
//!
//! Provides synthetic grids (boxes, spheres, random noise) and hand-built
//! meshes, plus assertions for the mesh invariants every stage must keep.

use std::collections::HashMap;

use glam::Vec3;

use crate::grid::{DenseGrid, GridBounds, VoxelGrid};
use crate::types::{Mesh, MeshBuilder, TriangleCollector};

// =============================================================================
// Synthetic grids
// =============================================================================

/// Grid of `extents` with the inclusive voxel box `min..=max` filled.
pub fn box_grid(extents: [usize; 3], min: [usize; 3], max: [usize; 3]) -> DenseGrid {
  let mut grid = DenseGrid::new(extents, GridBounds::default());
  grid.fill_box(min, max, true);
  grid
}

/// Filled cube of `side` voxels with `margin` empty voxels around it.
pub fn cube_grid(side: usize, margin: usize) -> DenseGrid {
  let n = side + 2 * margin;
  box_grid(
    [n; 3],
    [margin; 3],
    [margin + side - 1; 3],
  )
}

/// Two disjoint filled cubes of side 2 and side 1.
pub fn two_cubes_grid() -> DenseGrid {
  let mut grid = DenseGrid::new([10, 6, 6], GridBounds::default());
  grid.fill_box([1, 1, 1], [2, 2, 2], true);
  grid.fill_box([6, 2, 2], [6, 2, 2], true);
  grid
}

/// Scalar sphere field: distance to the center minus `radius`.
pub fn sphere_grid(n: usize, radius: f32) -> DenseGrid {
  let c = (n as f32 - 1.0) * 0.5;
  let center = Vec3::splat(c);
  DenseGrid::from_fn([n; 3], GridBounds::default(), |x, y, z| {
    Vec3::new(x as f32, y as f32, z as f32).distance(center) - radius
  })
}

/// Deterministic pseudo-random boolean grid.
pub fn noise_grid(extents: [usize; 3], seed: u64, fill: f32) -> DenseGrid {
  let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
  let mut grid = DenseGrid::new(extents, GridBounds::default());
  for x in 0..extents[0] {
    for y in 0..extents[1] {
      for z in 0..extents[2] {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let r = (state >> 40) as f32 / (1u64 << 24) as f32;
        grid.set_state(x, y, z, r < fill);
      }
    }
  }
  grid
}

// =============================================================================
// Hand-built meshes
// =============================================================================

/// Closed axis-aligned box from `min` to `min + size`, each face split into
/// `divisions × divisions` quads.
pub fn box_mesh(min: Vec3, size: f32, divisions: usize) -> Mesh {
  let mut builder = MeshBuilder::new();
  append_box(&mut builder, min, size, divisions);
  builder.finish()
}

/// Emit an outward-wound subdivided box into a collector.
pub fn append_box<C: TriangleCollector>(out: &mut C, min: Vec3, size: f32, divisions: usize) {
  // (normal axis, u axis, v axis) with u × v pointing along +normal.
  let frames = [(0usize, 1usize, 2usize), (1, 2, 0), (2, 0, 1)];
  for &(n, u, v) in &frames {
    for side in [0.0f32, 1.0] {
      for i in 0..divisions {
        for j in 0..divisions {
          let corner = |di: usize, dj: usize| {
            let mut p = min;
            p[n] += side * size;
            p[u] += size * (i + di) as f32 / divisions as f32;
            p[v] += size * (j + dj) as f32 / divisions as f32;
            p
          };
          let (a, b, c, d) = (corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1));
          if side > 0.0 {
            out.add_triangle(a, b, c);
            out.add_triangle(a, c, d);
          } else {
            out.add_triangle(a, c, b);
            out.add_triangle(a, d, c);
          }
        }
      }
    }
  }
}

// =============================================================================
// Assertions
// =============================================================================

/// Number of faces on each undirected edge.
pub fn edge_face_counts(mesh: &Mesh) -> HashMap<(u32, u32), usize> {
  let mut counts = HashMap::new();
  for face in &mesh.faces {
    for i in 0..3 {
      let (a, b) = (face[i], face[(i + 1) % 3]);
      *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
    }
  }
  counts
}

/// Every edge has exactly two faces and every directed edge appears once.
pub fn assert_closed_manifold(mesh: &Mesh) {
  for (edge, count) in edge_face_counts(mesh) {
    assert_eq!(count, 2, "edge {:?} has {} faces", edge, count);
  }
  let mut directed = HashMap::new();
  for face in &mesh.faces {
    for i in 0..3 {
      let key = (face[i], face[(i + 1) % 3]);
      assert!(
        directed.insert(key, ()).is_none(),
        "directed edge {:?} appears twice (inconsistent winding)",
        key
      );
    }
  }
}

/// Every triangle has three finite, pairwise distinct corners.
pub fn assert_valid_triangles(mesh: &Mesh) {
  mesh.validate().expect("indices in range");
  for face in 0..mesh.triangle_count() {
    let [a, b, c] = mesh.face_positions(face);
    for p in [a, b, c] {
      assert!(p.is_finite(), "face {} has non-finite corner {:?}", face, p);
    }
    assert!(a != b && b != c && a != c, "face {} has repeated corners", face);
  }
}

/// Volume of a grid's inside voxels.
pub fn voxel_volume<G: VoxelGrid>(grid: &G) -> f64 {
  let [nx, ny, nz] = grid.extents();
  let size = grid.bounds().voxel_size as f64;
  let mut count = 0usize;
  for x in 0..nx {
    for y in 0..ny {
      for z in 0..nz {
        count += usize::from(grid.state(x, y, z));
      }
    }
  }
  count as f64 * size * size * size
}
