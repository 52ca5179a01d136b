//! Core mesh types: indexed triangle sets, bounds and triangle sinks.

use std::collections::HashMap;

use glam::Vec3;

use crate::error::{MeshError, Result};

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Create AABB from min/max corners.
  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Expand AABB to include another box.
  pub fn merge(&mut self, other: &MinMaxAABB) {
    if other.is_valid() {
      self.encapsulate(other.min);
      self.encapsulate(other.max);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }

  /// Size along each axis, zero for an empty box.
  pub fn extent(&self) -> [f32; 3] {
    if !self.is_valid() {
      return [0.0; 3];
    }
    [
      self.max[0] - self.min[0],
      self.max[1] - self.min[1],
      self.max[2] - self.min[2],
    ]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Indexed triangle set.
///
/// Every face index refers to an entry of `positions`; `validate` checks
/// this for meshes built by hand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
  /// Vertex positions in world space.
  pub positions: Vec<Vec3>,

  /// Triangles as vertex index triples, counter-clockwise seen from outside.
  pub faces: Vec<[u32; 3]>,
}

impl Mesh {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(vertices: usize, faces: usize) -> Self {
    Self {
      positions: Vec::with_capacity(vertices),
      faces: Vec::with_capacity(faces),
    }
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.positions.clear();
    self.faces.clear();
  }

  /// Returns true if the mesh has no faces.
  pub fn is_empty(&self) -> bool {
    self.faces.is_empty()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.faces.len()
  }

  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  /// Append a vertex and return its index.
  #[inline]
  pub fn add_vertex(&mut self, position: Vec3) -> u32 {
    self.positions.push(position);
    (self.positions.len() - 1) as u32
  }

  #[inline]
  pub fn add_face(&mut self, face: [u32; 3]) {
    self.faces.push(face);
  }

  /// Corner positions of face `face`.
  #[inline]
  pub fn face_positions(&self, face: usize) -> [Vec3; 3] {
    let [a, b, c] = self.faces[face];
    [
      self.positions[a as usize],
      self.positions[b as usize],
      self.positions[c as usize],
    ]
  }

  /// Check that every face index is in range.
  pub fn validate(&self) -> Result<()> {
    let vertex_count = self.positions.len();
    for (face, indices) in self.faces.iter().enumerate() {
      if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(MeshError::IndexOutOfRange {
          face,
          index,
          vertex_count,
        });
      }
    }
    Ok(())
  }

  /// Bounding box of all vertices.
  pub fn bounds(&self) -> MinMaxAABB {
    let mut bounds = MinMaxAABB::empty();
    for p in &self.positions {
      bounds.encapsulate(p.to_array());
    }
    bounds
  }

  /// Signed enclosed volume (positive for outward-wound closed meshes).
  pub fn signed_volume(&self) -> f64 {
    signed_volume_of(self, 0..self.faces.len())
  }

  /// Send every triangle to a collector.
  pub fn emit<C: TriangleCollector + ?Sized>(&self, collector: &mut C) {
    for face in 0..self.faces.len() {
      let [a, b, c] = self.face_positions(face);
      collector.add_triangle(a, b, c);
    }
  }

  /// Copy of this mesh restricted to `faces`, with vertices renumbered in
  /// first-use order.
  pub fn subset(&self, faces: impl IntoIterator<Item = usize>) -> Mesh {
    let mut remap: HashMap<u32, u32> = HashMap::new();
    let mut out = Mesh::new();
    for face in faces {
      let mut indices = [0u32; 3];
      for (slot, &v) in indices.iter_mut().zip(self.faces[face].iter()) {
        *slot = *remap
          .entry(v)
          .or_insert_with(|| out.add_vertex(self.positions[v as usize]));
      }
      out.add_face(indices);
    }
    out
  }
}

/// Signed volume of a face subset, summing `v0 · (v1 × v2) / 6` in f64.
pub(crate) fn signed_volume_of(mesh: &Mesh, faces: impl IntoIterator<Item = usize>) -> f64 {
  let mut sum = 0.0f64;
  for face in faces {
    let [a, b, c] = mesh.face_positions(face);
    let (a, b, c) = (a.as_dvec3(), b.as_dvec3(), c.as_dvec3());
    sum += a.dot(b.cross(c));
  }
  sum / 6.0
}

/// Geometric normal of a triangle, zero when degenerate.
#[inline]
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
  (b - a).cross(c - a).normalize_or_zero()
}

// =============================================================================
// Triangle sinks
// =============================================================================

/// Receives output triangles one at a time.
///
/// Called once per triangle with its three world-space corners in
/// counter-clockwise order seen from outside.
pub trait TriangleCollector {
  fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3);
}

impl TriangleCollector for Vec<[Vec3; 3]> {
  fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
    self.push([a, b, c]);
  }
}

impl<C: TriangleCollector + ?Sized> TriangleCollector for &mut C {
  fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
    (**self).add_triangle(a, b, c);
  }
}

/// Adapts a closure into a [`TriangleCollector`].
pub struct FnCollector<F>(pub F);

impl<F: FnMut(Vec3, Vec3, Vec3)> TriangleCollector for FnCollector<F> {
  fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
    (self.0)(a, b, c);
  }
}

/// Builds an indexed [`Mesh`] from loose triangles, welding vertices with
/// bit-identical positions.
#[derive(Default)]
pub struct MeshBuilder {
  mesh: Mesh,
  lookup: HashMap<[u32; 3], u32>,
  degenerate: usize,
}

impl MeshBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  fn vertex(&mut self, p: Vec3) -> u32 {
    let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
    let mesh = &mut self.mesh;
    *self.lookup.entry(key).or_insert_with(|| mesh.add_vertex(p))
  }

  /// Triangles skipped because two corners welded together.
  pub fn degenerate_count(&self) -> usize {
    self.degenerate
  }

  pub fn triangle_count(&self) -> usize {
    self.mesh.triangle_count()
  }

  pub fn finish(self) -> Mesh {
    self.mesh
  }
}

impl TriangleCollector for MeshBuilder {
  fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
    let face = [self.vertex(a), self.vertex(b), self.vertex(c)];
    if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
      self.degenerate += 1;
      return;
    }
    self.mesh.add_face(face);
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
