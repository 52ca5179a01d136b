//! Marching cubes over the cells of one block.

use super::{cell_corners, SurfaceBuilder};
use crate::edge_table::{cube_triangles, EDGE_CORNERS, EDGE_TABLE};
use crate::partition::Block;

pub(super) fn polygonize(block: &Block, builder: &mut SurfaceBuilder<'_>) {
  for cx in block.min[0]..=block.max[0] {
    for cy in block.min[1]..=block.max[1] {
      for cz in block.min[2]..=block.max[2] {
        polygonize_cell(cx, cy, cz, builder);
      }
    }
  }
}

#[inline]
fn polygonize_cell(cx: usize, cy: usize, cz: usize, builder: &mut SurfaceBuilder<'_>) {
  let corners = cell_corners(cx, cy, cz);

  let mut case = 0u8;
  for (i, &corner) in corners.iter().enumerate() {
    if builder.value(corner) < 0.0 {
      case |= 1 << i;
    }
  }

  let edge_mask = EDGE_TABLE[case as usize];
  if edge_mask == 0 {
    return;
  }

  // Resolve crossed edges once per cell; triangles index into this.
  let mut edge_vertices = [u32::MAX; 12];
  for (edge, [a, b]) in EDGE_CORNERS.iter().enumerate() {
    if edge_mask & (1 << edge) != 0 {
      edge_vertices[edge] = builder.edge_vertex(corners[*a as usize], corners[*b as usize]);
    }
  }

  for [e0, e1, e2] in cube_triangles(case) {
    builder.add_triangle([edge_vertices[e0], edge_vertices[e1], edge_vertices[e2]]);
  }
}
