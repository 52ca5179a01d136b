//! Winged-edge topology over an indexed triangle mesh.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         WINGED-EDGE ARENA                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  vertices[v]  position, incident edge ids, seam key                     │
//! │  edges[e]     [v0, v1], incident face ids (≤ 2 when manifold)           │
//! │  faces[f]     [v0, v1, v2], [e01, e12, e20], normal                     │
//! │                                                                         │
//! │  Ids are arena indices and never change. Removal tombstones an entry;   │
//! │  `to_parts` compacts survivors back into a Mesh.                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Edge Collapse
//!
//! ```text
//!          c                       c
//!         / \                      │
//!        / f1\                     │
//!       a─────b       ──►          m
//!        \ f2/                     │
//!         \ /                      │
//!          d                       d
//! ```
//!
//! `f1`, `f2` and the edge are removed. Wing edge `(b,c)` merges into
//! `(a,c)` and `(b,d)` into `(a,d)`; the faces beyond the removed wings are
//! reattached to the surviving wing edges. Every remaining edge and face of
//! `a` or `b` is repointed to the new midpoint vertex `m`.

use std::collections::HashMap;

use glam::Vec3;
use smallvec::SmallVec;

use crate::error::{MeshError, Result};
use crate::extract::VertexKey;
use crate::types::{triangle_normal, Mesh};

pub type VertexId = u32;
pub type EdgeId = u32;
pub type FaceId = u32;

/// Squared length below which a recomputed face normal counts as degenerate.
const DEGENERATE_AREA_SQ: f32 = 1e-12;

#[derive(Clone, Debug)]
pub struct Vertex {
  pub position: Vec3,
  pub edges: SmallVec<[EdgeId; 8]>,

  /// Seam key of an extracted vertex; `None` once made by a collapse.
  pub key: Option<VertexKey>,
  alive: bool,
}

#[derive(Clone, Debug)]
pub struct Edge {
  pub vertices: [VertexId; 2],
  pub faces: SmallVec<[FaceId; 2]>,
  alive: bool,
}

#[derive(Clone, Debug)]
pub struct Face {
  pub vertices: [VertexId; 3],

  /// `edges[i]` joins `vertices[i]` and `vertices[(i + 1) % 3]`.
  pub edges: [EdgeId; 3],
  pub normal: Vec3,
  alive: bool,
}

impl Edge {
  #[inline]
  pub fn other(&self, v: VertexId) -> VertexId {
    if self.vertices[0] == v {
      self.vertices[1]
    } else {
      self.vertices[0]
    }
  }

  #[inline]
  fn joins(&self, a: VertexId, b: VertexId) -> bool {
    (self.vertices[0] == a && self.vertices[1] == b) || (self.vertices[0] == b && self.vertices[1] == a)
  }
}

impl Face {
  /// Vertex of this face not on edge `[a, b]`.
  #[inline]
  fn opposite(&self, [a, b]: [VertexId; 2]) -> VertexId {
    self
      .vertices
      .into_iter()
      .find(|&v| v != a && v != b)
      .unwrap_or(a)
  }
}

/// Arena-backed winged-edge mesh.
#[derive(Clone, Debug, Default)]
pub struct WingedEdgeMesh {
  vertices: Vec<Vertex>,
  edges: Vec<Edge>,
  faces: Vec<Face>,
  live_faces: usize,
}

impl WingedEdgeMesh {
  /// Build topology from an indexed mesh and its per-vertex seam keys.
  ///
  /// `keys` may be shorter than the vertex list; missing entries are `None`.
  /// Faces with a repeated vertex are dropped.
  pub fn from_parts(mesh: &Mesh, keys: &[Option<VertexKey>]) -> Result<Self> {
    mesh.validate()?;

    let mut out = Self {
      vertices: mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
          position,
          edges: SmallVec::new(),
          key: keys.get(i).copied().flatten(),
          alive: true,
        })
        .collect(),
      edges: Vec::with_capacity(mesh.faces.len() * 3 / 2),
      faces: Vec::with_capacity(mesh.faces.len()),
      live_faces: 0,
    };

    let mut lookup: HashMap<(VertexId, VertexId), EdgeId> = HashMap::with_capacity(mesh.faces.len() * 3 / 2);
    for indices in &mesh.faces {
      let [a, b, c] = *indices;
      if a == b || b == c || a == c {
        continue;
      }
      let face_id = out.faces.len() as FaceId;
      let mut edges = [0; 3];
      for i in 0..3 {
        let (u, v) = (indices[i], indices[(i + 1) % 3]);
        let edge_id = *lookup.entry((u.min(v), u.max(v))).or_insert_with(|| {
          let id = out.edges.len() as EdgeId;
          out.edges.push(Edge {
            vertices: [u.min(v), u.max(v)],
            faces: SmallVec::new(),
            alive: true,
          });
          out.vertices[u as usize].edges.push(id);
          out.vertices[v as usize].edges.push(id);
          id
        });
        out.edges[edge_id as usize].faces.push(face_id);
        edges[i] = edge_id;
      }
      let normal = triangle_normal(
        out.vertices[a as usize].position,
        out.vertices[b as usize].position,
        out.vertices[c as usize].position,
      );
      out.faces.push(Face {
        vertices: *indices,
        edges,
        normal,
        alive: true,
      });
      out.live_faces += 1;
    }

    Ok(out)
  }

  /// Compact live elements back into an indexed mesh plus seam keys.
  ///
  /// Vertices keep their relative order; vertices no face uses are dropped.
  pub fn to_parts(&self) -> (Mesh, Vec<Option<VertexKey>>) {
    let mut used = vec![false; self.vertices.len()];
    for face in self.live_face_iter() {
      for v in face.vertices {
        used[v as usize] = true;
      }
    }

    let mut remap = vec![u32::MAX; self.vertices.len()];
    let mut mesh = Mesh::with_capacity(self.vertices.len(), self.live_faces);
    let mut keys = Vec::with_capacity(self.vertices.len());
    for (i, vertex) in self.vertices.iter().enumerate() {
      if vertex.alive && used[i] {
        remap[i] = mesh.add_vertex(vertex.position);
        keys.push(vertex.key);
      }
    }
    for face in self.live_face_iter() {
      mesh.add_face(face.vertices.map(|v| remap[v as usize]));
    }
    (mesh, keys)
  }

  // ===========================================================================
  // Accessors
  // ===========================================================================

  /// Number of live faces.
  #[inline]
  pub fn face_count(&self) -> usize {
    self.live_faces
  }

  pub fn is_empty(&self) -> bool {
    self.live_faces == 0
  }

  #[inline]
  pub fn vertex(&self, id: VertexId) -> &Vertex {
    &self.vertices[id as usize]
  }

  #[inline]
  pub fn edge(&self, id: EdgeId) -> &Edge {
    &self.edges[id as usize]
  }

  #[inline]
  pub fn face(&self, id: FaceId) -> &Face {
    &self.faces[id as usize]
  }

  #[inline]
  pub fn is_edge_alive(&self, id: EdgeId) -> bool {
    self.edges[id as usize].alive
  }

  /// Ids of live edges in creation order.
  pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
    self
      .edges
      .iter()
      .enumerate()
      .filter(|(_, e)| e.alive)
      .map(|(i, _)| i as EdgeId)
  }

  fn live_face_iter(&self) -> impl Iterator<Item = &Face> + '_ {
    self.faces.iter().filter(|f| f.alive)
  }

  #[inline]
  pub fn position(&self, id: VertexId) -> Vec3 {
    self.vertices[id as usize].position
  }

  pub fn edge_length(&self, id: EdgeId) -> f32 {
    let [a, b] = self.edges[id as usize].vertices;
    self.position(a).distance(self.position(b))
  }

  pub fn midpoint(&self, id: EdgeId) -> Vec3 {
    let [a, b] = self.edges[id as usize].vertices;
    (self.position(a) + self.position(b)) * 0.5
  }

  /// Current geometric normal of a face, zero when degenerate.
  pub fn geometric_normal(&self, id: FaceId) -> Vec3 {
    let [a, b, c] = self.faces[id as usize].vertices;
    triangle_normal(self.position(a), self.position(b), self.position(c))
  }

  /// Vertices sharing an edge with `v`.
  pub fn neighbors(&self, v: VertexId) -> SmallVec<[VertexId; 8]> {
    self.vertices[v as usize]
      .edges
      .iter()
      .map(|&e| self.edges[e as usize].other(v))
      .collect()
  }

  /// Distinct faces touching `v`, in incident-edge order.
  pub fn faces_around(&self, v: VertexId) -> SmallVec<[FaceId; 16]> {
    let mut out: SmallVec<[FaceId; 16]> = SmallVec::new();
    for &e in &self.vertices[v as usize].edges {
      for &f in &self.edges[e as usize].faces {
        if !out.contains(&f) {
          out.push(f);
        }
      }
    }
    out
  }

  pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
    self.vertices[a as usize]
      .edges
      .iter()
      .copied()
      .find(|&e| self.edges[e as usize].other(a) == b)
  }

  /// Whether the faces around `v` form one closed fan.
  ///
  /// False for vertices on a boundary or non-manifold edge and for pinch
  /// vertices where two fans meet.
  pub fn is_interior_vertex(&self, v: VertexId) -> bool {
    let edges = &self.vertices[v as usize].edges;
    if edges.len() < 3 || edges.iter().any(|&e| self.edges[e as usize].faces.len() != 2) {
      return false;
    }

    let start = edges[0];
    let mut edge = start;
    let mut face = self.edges[start as usize].faces[0];
    let mut steps = 0;
    loop {
      let next = self.fan_step(face, v, edge);
      steps += 1;
      let faces = &self.edges[next as usize].faces;
      face = if faces[0] == face { faces[1] } else { faces[0] };
      edge = next;
      if edge == start || steps > edges.len() {
        break;
      }
    }
    edge == start && steps == edges.len()
  }

  /// The edge of `face` at `v` other than `edge`.
  #[inline]
  fn fan_step(&self, face: FaceId, v: VertexId, edge: EdgeId) -> EdgeId {
    let f = &self.faces[face as usize];
    let i = f.vertices.iter().position(|&x| x == v).unwrap_or(0);
    let (e1, e2) = (f.edges[i], f.edges[(i + 2) % 3]);
    if e1 == edge {
      e2
    } else {
      e1
    }
  }

  /// Opposite vertices `[c, d]` of the two faces of an interior edge.
  pub fn wing_vertices(&self, id: EdgeId) -> Option<[VertexId; 2]> {
    let edge = &self.edges[id as usize];
    if edge.faces.len() != 2 {
      return None;
    }
    let c = self.faces[edge.faces[0] as usize].opposite(edge.vertices);
    let d = self.faces[edge.faces[1] as usize].opposite(edge.vertices);
    Some([c, d])
  }

  // ===========================================================================
  // Collapse
  // ===========================================================================

  /// Topological guards for collapsing edge `id` to its midpoint.
  ///
  /// Rejects boundary and non-manifold neighbourhoods, link-condition
  /// violations, opposite vertices of valence ≤ 3, and collapses that would
  /// flip or degenerate a surviving face.
  pub fn can_collapse(&self, id: EdgeId) -> bool {
    let edge = &self.edges[id as usize];
    if !edge.alive || edge.faces.len() != 2 {
      return false;
    }
    let [a, b] = edge.vertices;
    if !self.is_interior_vertex(a) || !self.is_interior_vertex(b) {
      return false;
    }
    let Some([c, d]) = self.wing_vertices(id) else {
      return false;
    };
    if c == d {
      return false;
    }

    let na = self.neighbors(a);
    let common = self.neighbors(b).into_iter().filter(|v| na.contains(v)).count();
    if common != 2 {
      return false;
    }
    if self.vertices[c as usize].edges.len() <= 3 || self.vertices[d as usize].edges.len() <= 3 {
      return false;
    }

    let m = self.midpoint(id);
    let (f1, f2) = (edge.faces[0], edge.faces[1]);
    for v in [a, b] {
      for f in self.faces_around(v) {
        if f == f1 || f == f2 {
          continue;
        }
        let corners = self.faces[f as usize]
          .vertices
          .map(|x| if x == a || x == b { m } else { self.position(x) });
        let moved = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
        if moved.length_squared() < DEGENERATE_AREA_SQ {
          return false;
        }
        if self.geometric_normal(f).dot(moved) <= 0.0 {
          return false;
        }
      }
    }
    true
  }

  /// Collapse edge `id` to its midpoint and return the new vertex.
  ///
  /// The caller must have checked [`can_collapse`](Self::can_collapse).
  /// With `preserve_normals` each surviving face keeps its stored normal,
  /// otherwise normals of repointed faces are recomputed.
  pub fn collapse(&mut self, id: EdgeId, preserve_normals: bool) -> VertexId {
    let [a, b] = self.edges[id as usize].vertices;
    let wing_faces = [
      self.edges[id as usize].faces[0],
      self.edges[id as usize].faces[1],
    ];

    let position = self.midpoint(id);
    let m = self.vertices.len() as VertexId;
    self.vertices.push(Vertex {
      position,
      edges: SmallVec::new(),
      key: None,
      alive: true,
    });

    for f in wing_faces {
      self.merge_wing(f, id, a, b);
    }

    self.edges[id as usize].alive = false;
    self.edges[id as usize].faces.clear();
    self.vertices[a as usize].edges.retain(|e| *e != id);
    self.vertices[b as usize].edges.retain(|e| *e != id);

    let mut touched: SmallVec<[FaceId; 16]> = SmallVec::new();
    for v in [a, b] {
      let edges = std::mem::take(&mut self.vertices[v as usize].edges);
      for &e in &edges {
        for end in &mut self.edges[e as usize].vertices {
          if *end == v {
            *end = m;
          }
        }
        for &f in &self.edges[e as usize].faces {
          if !touched.contains(&f) {
            touched.push(f);
          }
        }
      }
      self.vertices[m as usize].edges.extend(edges);
      self.vertices[v as usize].alive = false;
    }

    for f in touched {
      for corner in &mut self.faces[f as usize].vertices {
        if *corner == a || *corner == b {
          *corner = m;
        }
      }
      if !preserve_normals {
        let normal = self.geometric_normal(f);
        self.faces[f as usize].normal = normal;
      }
    }

    m
  }

  /// Remove wing face `f` of edge `e = (a, b)`, folding edge `(b, c)` into
  /// `(a, c)`.
  fn merge_wing(&mut self, f: FaceId, e: EdgeId, a: VertexId, b: VertexId) {
    let face = &self.faces[f as usize];
    let c = face.opposite([a, b]);
    let mut e_bc = e;
    let mut e_ac = e;
    for &x in &face.edges {
      if self.edges[x as usize].joins(b, c) {
        e_bc = x;
      } else if self.edges[x as usize].joins(a, c) {
        e_ac = x;
      }
    }

    let beyond = self.edges[e_bc as usize]
      .faces
      .iter()
      .copied()
      .find(|&g| g != f);

    self.edges[e_ac as usize].faces.retain(|g| *g != f);
    if let Some(g) = beyond {
      for slot in &mut self.faces[g as usize].edges {
        if *slot == e_bc {
          *slot = e_ac;
        }
      }
      self.edges[e_ac as usize].faces.push(g);
    }

    self.edges[e_bc as usize].alive = false;
    self.edges[e_bc as usize].faces.clear();
    self.vertices[c as usize].edges.retain(|x| *x != e_bc);
    self.vertices[b as usize].edges.retain(|x| *x != e_bc);

    self.faces[f as usize].alive = false;
    self.live_faces -= 1;
  }

  // ===========================================================================
  // Validation
  // ===========================================================================

  /// Check incidence consistency and that no live edge has more than two
  /// faces.
  pub fn check_manifold(&self) -> Result<()> {
    for (i, edge) in self.edges.iter().enumerate() {
      if edge.alive {
        self.check_edge(i as EdgeId)?;
      }
    }
    for face in self.live_face_iter() {
      for (i, &e) in face.edges.iter().enumerate() {
        let edge = &self.edges[e as usize];
        let joined = edge.joins(face.vertices[i], face.vertices[(i + 1) % 3]);
        if !edge.alive || !joined {
          return Err(MeshError::NonManifold {
            edge: e,
            faces: edge.faces.len(),
          });
        }
      }
    }
    Ok(())
  }

  /// Local form of [`check_manifold`](Self::check_manifold) over the edges
  /// of one vertex.
  pub fn check_vertex(&self, v: VertexId) -> Result<()> {
    for &e in &self.vertices[v as usize].edges {
      self.check_edge(e)?;
    }
    Ok(())
  }

  fn check_edge(&self, id: EdgeId) -> Result<()> {
    let edge = &self.edges[id as usize];
    let consistent = edge.alive
      && (1..=2).contains(&edge.faces.len())
      && edge.faces.iter().all(|&f| {
        let face = &self.faces[f as usize];
        face.alive && face.edges.contains(&id)
      });
    if consistent {
      Ok(())
    } else {
      Err(MeshError::NonManifold {
        edge: id,
        faces: edge.faces.len(),
      })
    }
  }
}

#[cfg(test)]
#[path = "winged_edge_test.rs"]
mod winged_edge_test;
