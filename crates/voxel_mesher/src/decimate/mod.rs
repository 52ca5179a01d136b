//! Edge-collapse mesh decimation on a winged-edge graph.
//!
//! # Pass Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          DECIMATION PASS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. Scan live edges in id order, keep those the policy accepts.         │
//! │  2. For each candidate:                                                 │
//! │       skip if an endpoint is locked by an earlier collapse              │
//! │       skip if the topological guards reject it                          │
//! │       collapse to midpoint, lock the new vertex and its one-ring        │
//! │  3. Stop when nothing collapsed, the pass cap is hit, or the face       │
//! │     target is met.                                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Locking the one-ring means every collapse later in the same pass sees
//! the geometry it was accepted against. Vertices on boundary edges are
//! never moved, so open block seams keep their extracted positions.

mod policy;
mod winged_edge;

use std::collections::HashSet;

pub use policy::{CollapsePolicy, FlatnessPolicy, GridGuard};
pub use winged_edge::{Edge, EdgeId, Face, FaceId, Vertex, VertexId, WingedEdgeMesh};

use crate::constants::MAX_DECIMATION_PASSES;

/// Per-run decimation settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecimationParams {
  /// Stop once the live face count is at or below this.
  pub target_faces: Option<usize>,

  pub max_passes: usize,

  /// Carry original face normals through collapses instead of recomputing.
  pub preserve_normals: bool,
}

impl Default for DecimationParams {
  fn default() -> Self {
    Self {
      target_faces: None,
      max_passes: MAX_DECIMATION_PASSES,
      preserve_normals: true,
    }
  }
}

/// Counters from one [`decimate`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecimationStats {
  pub faces_before: usize,
  pub faces_after: usize,
  pub passes: usize,
  pub collapses: usize,

  /// Policy-approved edges refused by the topological guards.
  pub rejected: usize,
}

impl DecimationStats {
  pub fn accumulate(&mut self, other: &DecimationStats) {
    self.faces_before += other.faces_before;
    self.faces_after += other.faces_after;
    self.passes += other.passes;
    self.collapses += other.collapses;
    self.rejected += other.rejected;
  }
}

/// Simplify `mesh` in place by repeated midpoint edge collapses.
///
/// Never increases the face count. An empty mesh, a zero pass cap, or a
/// target at or above the current face count leaves the mesh untouched.
pub fn decimate<P: CollapsePolicy + ?Sized>(
  mesh: &mut WingedEdgeMesh,
  policy: &P,
  params: &DecimationParams,
) -> DecimationStats {
  let mut stats = DecimationStats {
    faces_before: mesh.face_count(),
    faces_after: mesh.face_count(),
    ..Default::default()
  };
  let target_met = |faces: usize| params.target_faces.is_some_and(|t| faces <= t);
  if mesh.is_empty() || target_met(mesh.face_count()) {
    return stats;
  }

  for _ in 0..params.max_passes {
    let candidates: Vec<EdgeId> = mesh
      .edge_ids()
      .filter(|&e| mesh.edge(e).faces.len() == 2 && policy.accept(mesh, e))
      .collect();

    let mut locked: HashSet<VertexId> = HashSet::new();
    let mut collapsed = 0;
    for edge in candidates {
      if target_met(mesh.face_count()) {
        break;
      }
      if !mesh.is_edge_alive(edge) {
        continue;
      }
      let [a, b] = mesh.edge(edge).vertices;
      if locked.contains(&a) || locked.contains(&b) {
        continue;
      }
      if !mesh.can_collapse(edge) {
        stats.rejected += 1;
        continue;
      }

      let m = mesh.collapse(edge, params.preserve_normals);
      debug_assert!(mesh.check_vertex(m).is_ok(), "collapse of edge {} broke manifold", edge);
      locked.insert(m);
      locked.extend(mesh.neighbors(m));
      collapsed += 1;
    }

    stats.passes += 1;
    stats.collapses += collapsed;
    debug_assert!(mesh.check_manifold().is_ok(), "pass {} broke manifold", stats.passes);
    tracing::trace!(
      pass = stats.passes,
      collapsed,
      faces = mesh.face_count(),
      "decimation pass"
    );

    if collapsed == 0 || target_met(mesh.face_count()) {
      break;
    }
  }

  stats.faces_after = mesh.face_count();
  stats
}
