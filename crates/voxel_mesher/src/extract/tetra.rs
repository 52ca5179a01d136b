//! Marching tetrahedra over the cells of one block.
//!
//! Each cell splits into the six tetrahedra of `TETRAHEDRA`. A tetrahedron
//! yields zero, one or two triangles; winding is chosen per triangle so its
//! normal points from the inside corners toward the outside corners.

use glam::Vec3;

use super::{cell_corners, SurfaceBuilder};
use crate::edge_table::{tet_triangles, TETRAHEDRA, TET_EDGES};
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
  let values = corners.map(|c| builder.value(c));

  let all_inside = values.iter().all(|&v| v < 0.0);
  let all_outside = values.iter().all(|&v| v >= 0.0);
  if all_inside || all_outside {
    return;
  }

  for tet in &TETRAHEDRA {
    let tet_corners = tet.map(|c| corners[c as usize]);
    let mut case = 0u8;
    for (i, &c) in tet.iter().enumerate() {
      if values[c as usize] < 0.0 {
        case |= 1 << i;
      }
    }
    if case == 0 || case == 0xF {
      continue;
    }

    let direction = outward_direction(&tet_corners, case);
    for tri in tet_triangles(case) {
      let mut face = tri.map(|edge| {
        let [a, b] = TET_EDGES[edge];
        builder.edge_vertex(tet_corners[a as usize], tet_corners[b as usize])
      });

      let [p0, p1, p2] = face.map(|v| builder.position(v));
      if (p1 - p0).cross(p2 - p0).dot(direction) < 0.0 {
        face.swap(1, 2);
      }
      builder.add_triangle(face);
    }
  }
}

/// Vector from the centroid of the inside corners to that of the outside
/// corners.
fn outward_direction(corners: &[[i64; 3]; 4], case: u8) -> Vec3 {
  let mut inside = Vec3::ZERO;
  let mut outside = Vec3::ZERO;
  let inside_count = case.count_ones() as f32;
  let outside_count = 4.0 - inside_count;
  for (i, c) in corners.iter().enumerate() {
    let p = Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32);
    if case & (1 << i) != 0 {
      inside += p;
    } else {
      outside += p;
    }
  }
  outside / outside_count - inside / inside_count
}
