use glam::Vec3;

use super::*;
use crate::pipeline::test_utils::*;

fn tetrahedron() -> Mesh {
  Mesh {
    positions: vec![
      Vec3::new(0.0, 0.0, 0.0),
      Vec3::new(1.0, 0.0, 0.0),
      Vec3::new(0.0, 1.0, 0.0),
      Vec3::new(0.0, 0.0, 1.0),
    ],
    faces: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
  }
}

#[test]
fn test_from_parts_builds_closed_topology() {
  let mesh = box_mesh(Vec3::ZERO, 1.0, 1);
  let topo = WingedEdgeMesh::from_parts(&mesh, &[]).unwrap();

  assert_eq!(topo.face_count(), 12);
  assert_eq!(topo.edge_ids().count(), 18);
  for e in topo.edge_ids() {
    assert_eq!(topo.edge(e).faces.len(), 2);
  }
  for v in 0..8 {
    assert!(topo.is_interior_vertex(v));
  }
  assert!(topo.check_manifold().is_ok());
}

#[test]
fn test_face_edges_follow_vertex_cycle() {
  let mesh = box_mesh(Vec3::ZERO, 1.0, 2);
  let topo = WingedEdgeMesh::from_parts(&mesh, &[]).unwrap();
  for f in 0..topo.face_count() as FaceId {
    let face = topo.face(f);
    for i in 0..3 {
      let edge = topo.edge(face.edges[i]);
      let (u, v) = (face.vertices[i], face.vertices[(i + 1) % 3]);
      assert!(edge.vertices.contains(&u) && edge.vertices.contains(&v));
      assert!(edge.faces.contains(&f));
    }
  }
}

#[test]
fn test_round_trip_keeps_mesh_and_keys() {
  let mesh = box_mesh(Vec3::ZERO, 2.0, 3);
  let keys: Vec<Option<VertexKey>> = (0..mesh.vertex_count() as u64).map(|i| Some((i, i + 1))).collect();
  let topo = WingedEdgeMesh::from_parts(&mesh, &keys).unwrap();
  let (back, back_keys) = topo.to_parts();
  assert_eq!(back, mesh);
  assert_eq!(back_keys, keys);
}

#[test]
fn test_rejects_out_of_range_indices() {
  let mut mesh = tetrahedron();
  mesh.faces.push([0, 1, 9]);
  assert!(matches!(
    WingedEdgeMesh::from_parts(&mesh, &[]),
    Err(MeshError::IndexOutOfRange { index: 9, .. })
  ));
}

#[test]
fn test_degenerate_faces_are_dropped() {
  let mut mesh = tetrahedron();
  mesh.faces.push([1, 1, 2]);
  let topo = WingedEdgeMesh::from_parts(&mesh, &[]).unwrap();
  assert_eq!(topo.face_count(), 4);
}

#[test]
fn test_open_mesh_has_boundary_vertices() {
  let mesh = Mesh {
    positions: vec![
      Vec3::new(0.0, 0.0, 0.0),
      Vec3::new(1.0, 0.0, 0.0),
      Vec3::new(1.0, 1.0, 0.0),
      Vec3::new(0.0, 1.0, 0.0),
    ],
    faces: vec![[0, 1, 2], [0, 2, 3]],
  };
  let topo = WingedEdgeMesh::from_parts(&mesh, &[]).unwrap();
  assert!(topo.check_manifold().is_ok());
  for v in 0..4 {
    assert!(!topo.is_interior_vertex(v));
  }
  let diagonal = topo.find_edge(0, 2).unwrap();
  assert_eq!(topo.edge(diagonal).faces.len(), 2);
  assert!(!topo.can_collapse(diagonal));
}

#[test]
fn test_tetrahedron_edges_fail_valence_guard() {
  let topo = WingedEdgeMesh::from_parts(&tetrahedron(), &[]).unwrap();
  for e in topo.edge_ids() {
    assert!(!topo.can_collapse(e), "edge {} of a tetrahedron must not collapse", e);
  }
}

#[test]
fn test_collapse_inside_flat_face_keeps_volume() {
  let mesh = box_mesh(Vec3::ZERO, 2.0, 4);
  let mut topo = WingedEdgeMesh::from_parts(&mesh, &[]).unwrap();

  // Both endpoints strictly inside one box side.
  let on_single_side = |p: Vec3| p.to_array().iter().filter(|&&x| x == 0.0 || x == 2.0).count() == 1;
  let edge = topo
    .edge_ids()
    .find(|&e| {
      let [a, b] = topo.edge(e).vertices;
      on_single_side(topo.position(a)) && on_single_side(topo.position(b)) && topo.can_collapse(e)
    })
    .expect("a collapsible interior edge");
  let expected_midpoint = topo.midpoint(edge);

  let m = topo.collapse(edge, true);
  assert_eq!(topo.face_count(), mesh.triangle_count() - 2);
  assert_eq!(topo.position(m), expected_midpoint);
  assert_eq!(topo.vertex(m).key, None);
  assert!(!topo.is_edge_alive(edge));
  assert!(topo.check_manifold().is_ok());
  assert!(topo.check_vertex(m).is_ok());

  let (out, keys) = topo.to_parts();
  assert_eq!(keys.len(), out.vertex_count());
  assert_closed_manifold(&out);
  assert!((out.signed_volume() - 8.0).abs() < 1e-4);
}

#[test]
fn test_collapse_can_recompute_normals() {
  let mesh = box_mesh(Vec3::ZERO, 2.0, 4);
  let mut topo = WingedEdgeMesh::from_parts(&mesh, &[]).unwrap();
  let edge = topo.edge_ids().find(|&e| topo.can_collapse(e)).unwrap();
  let m = topo.collapse(edge, false);
  for f in topo.faces_around(m) {
    let stored = topo.face(f).normal;
    assert!((stored - topo.geometric_normal(f)).length() < 1e-6);
  }
}

#[test]
fn test_neighbors_and_wings() {
  let mesh = box_mesh(Vec3::ZERO, 1.0, 2);
  let topo = WingedEdgeMesh::from_parts(&mesh, &[]).unwrap();
  for e in topo.edge_ids() {
    let [a, b] = topo.edge(e).vertices;
    assert!(topo.neighbors(a).contains(&b));
    assert_eq!(topo.find_edge(b, a), Some(e));
    let [c, d] = topo.wing_vertices(e).unwrap();
    assert!(c != a && c != b && d != a && d != b);
  }
}
