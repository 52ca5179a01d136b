//! Stage 4: merge block meshes into one mesh.
//!
//! Block meshes are concatenated in partition order. Vertices that sit on a
//! block seam carry a [`VertexKey`]; the first occurrence of a key owns the
//! output vertex and later occurrences are welded onto it. Decimation never
//! moves a keyed vertex, so neighbouring blocks agree on its position.

use std::collections::HashMap;

use crate::extract::{BlockMesh, VertexKey};
use crate::types::Mesh;

/// Merged mesh and weld counters.
#[derive(Clone, Debug, Default)]
pub struct Assembly {
  pub mesh: Mesh,
  pub welded: usize,
  pub degenerate: usize,
}

/// Concatenate `blocks` in order, welding shared seam vertices.
pub fn assemble(blocks: &[BlockMesh]) -> Assembly {
  let vertices: usize = blocks.iter().map(|b| b.mesh.vertex_count()).sum();
  let faces: usize = blocks.iter().map(BlockMesh::triangle_count).sum();

  let mut out = Assembly {
    mesh: Mesh::with_capacity(vertices, faces),
    ..Default::default()
  };
  let mut seam: HashMap<VertexKey, u32> = HashMap::new();
  let mut remap: Vec<u32> = Vec::new();

  for block in blocks {
    remap.clear();
    for (local, &position) in block.mesh.positions.iter().enumerate() {
      let key = block.vertex_keys.get(local).copied().flatten();
      let index = match key {
        Some(key) => match seam.get(&key) {
          Some(&existing) => {
            out.welded += 1;
            existing
          }
          None => {
            let index = out.mesh.add_vertex(position);
            seam.insert(key, index);
            index
          }
        },
        None => out.mesh.add_vertex(position),
      };
      remap.push(index);
    }

    for face in &block.mesh.faces {
      let [a, b, c] = face.map(|i| remap[i as usize]);
      if a == b || b == c || c == a {
        out.degenerate += 1;
        continue;
      }
      out.mesh.add_face([a, b, c]);
    }
  }

  tracing::debug!(
    blocks = blocks.len(),
    vertices = out.mesh.vertex_count(),
    faces = out.mesh.triangle_count(),
    welded = out.welded,
    degenerate = out.degenerate,
    "assembled"
  );
  out
}

#[cfg(test)]
#[path = "assemble_test.rs"]
mod assemble_test;
