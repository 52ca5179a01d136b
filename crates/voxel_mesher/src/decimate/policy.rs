//! Collapse predicates.
//!
//! A [`CollapsePolicy`] decides which edges are worth collapsing; the
//! topological guards in [`WingedEdgeMesh::can_collapse`] decide which are
//! safe. Policies only read the mesh.

use glam::Vec3;

use super::winged_edge::{EdgeId, WingedEdgeMesh};
use crate::grid::VoxelGrid;

/// Pluggable edge-collapse predicate.
pub trait CollapsePolicy: Sync {
  fn accept(&self, mesh: &WingedEdgeMesh, edge: EdgeId) -> bool;
}

impl<F> CollapsePolicy for F
where
  F: Fn(&WingedEdgeMesh, EdgeId) -> bool + Sync,
{
  fn accept(&self, mesh: &WingedEdgeMesh, edge: EdgeId) -> bool {
    self(mesh, edge)
  }
}

/// Accepts edges lying in a near-flat neighbourhood.
///
/// For edge `e = (a, b)` with faces `f1`, `f2`:
/// - every face around `a` or `b` has a stored normal within `min_normal_cos`
///   of `f1` or of `f2`;
/// - `|a - b| < max_edge_length`;
/// - the midpoint is within `max_error` (squared distance) of every face
///   plane around `a` and `b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatnessPolicy {
  pub min_normal_cos: f32,
  pub max_edge_length: f32,
  pub max_error: f32,
}

impl FlatnessPolicy {
  pub fn new(min_normal_cos: f32, max_edge_length: f32, max_error: f32) -> Self {
    Self {
      min_normal_cos,
      max_edge_length,
      max_error,
    }
  }
}

impl CollapsePolicy for FlatnessPolicy {
  fn accept(&self, mesh: &WingedEdgeMesh, edge: EdgeId) -> bool {
    let e = mesh.edge(edge);
    if e.faces.len() != 2 {
      return false;
    }
    if mesh.edge_length(edge) >= self.max_edge_length {
      return false;
    }

    let n1 = mesh.face(e.faces[0]).normal;
    let n2 = mesh.face(e.faces[1]).normal;
    let midpoint = mesh.midpoint(edge);

    for v in e.vertices {
      for f in mesh.faces_around(v) {
        let n = mesh.face(f).normal;
        if n.dot(n1) < self.min_normal_cos && n.dot(n2) < self.min_normal_cos {
          return false;
        }

        let plane = mesh.geometric_normal(f);
        if plane == Vec3::ZERO {
          continue;
        }
        let origin = mesh.position(mesh.face(f).vertices[0]);
        let distance = (midpoint - origin).dot(plane);
        if distance * distance > self.max_error {
          return false;
        }
      }
    }
    true
  }
}

/// Wraps a policy and additionally requires the collapse midpoint, moved
/// half a voxel against the local normal, to fall inside the source grid's
/// solid.
pub struct GridGuard<'g, P, G: ?Sized> {
  pub inner: P,
  pub grid: &'g G,
}

impl<'g, P, G: ?Sized> GridGuard<'g, P, G> {
  pub fn new(inner: P, grid: &'g G) -> Self {
    Self { inner, grid }
  }
}

impl<P: CollapsePolicy, G: VoxelGrid + ?Sized> CollapsePolicy for GridGuard<'_, P, G> {
  fn accept(&self, mesh: &WingedEdgeMesh, edge: EdgeId) -> bool {
    if !self.inner.accept(mesh, edge) {
      return false;
    }
    let e = mesh.edge(edge);
    if e.faces.len() != 2 {
      return false;
    }
    let normal = (mesh.face(e.faces[0]).normal + mesh.face(e.faces[1]).normal).normalize_or_zero();
    if normal == Vec3::ZERO {
      return false;
    }
    let pitch = self.grid.bounds().voxel_size;
    let probe = mesh.midpoint(edge) - normal * (0.5 * pitch);
    self.grid.is_inside_at(probe)
  }
}
