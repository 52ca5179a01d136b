use glam::Vec3;

use super::*;

/// Unit tetrahedron wound outward.
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
fn test_aabb_empty_is_invalid() {
  let aabb = MinMaxAABB::empty();
  assert!(!aabb.is_valid());
  assert_eq!(aabb.extent(), [0.0; 3]);
}

#[test]
fn test_aabb_encapsulate_and_merge() {
  let mut a = MinMaxAABB::empty();
  a.encapsulate([1.0, 2.0, 3.0]);
  a.encapsulate([-1.0, 0.0, 5.0]);
  assert!(a.is_valid());
  assert_eq!(a.min, [-1.0, 0.0, 3.0]);
  assert_eq!(a.max, [1.0, 2.0, 5.0]);

  let mut b = MinMaxAABB::new([0.0; 3], [0.5; 3]);
  b.merge(&a);
  b.merge(&MinMaxAABB::empty());
  assert_eq!(b.min, [-1.0, 0.0, 0.0]);
  assert_eq!(b.max, [1.0, 2.0, 5.0]);
}

#[test]
fn test_tetrahedron_volume_is_positive() {
  let mesh = tetrahedron();
  let volume = mesh.signed_volume();
  assert!((volume - 1.0 / 6.0).abs() < 1e-9, "volume = {}", volume);
}

#[test]
fn test_flipped_mesh_has_negative_volume() {
  let mut mesh = tetrahedron();
  for face in &mut mesh.faces {
    face.swap(1, 2);
  }
  assert!(mesh.signed_volume() < 0.0);
}

#[test]
fn test_validate_rejects_out_of_range_index() {
  let mut mesh = tetrahedron();
  assert!(mesh.validate().is_ok());
  mesh.faces.push([0, 1, 9]);
  match mesh.validate() {
    Err(MeshError::IndexOutOfRange { face, index, .. }) => {
      assert_eq!(face, 4);
      assert_eq!(index, 9);
    }
    other => panic!("unexpected result: {:?}", other),
  }
}

#[test]
fn test_subset_compacts_vertices() {
  let mesh = tetrahedron();
  let sub = mesh.subset([3]);
  assert_eq!(sub.triangle_count(), 1);
  assert_eq!(sub.vertex_count(), 3);
  assert_eq!(sub.faces[0], [0, 1, 2]);
  assert_eq!(sub.positions[0], mesh.positions[1]);
}

#[test]
fn test_emit_round_trips_through_builder() {
  let mesh = tetrahedron();
  let mut builder = MeshBuilder::new();
  mesh.emit(&mut builder);
  let rebuilt = builder.finish();
  assert_eq!(rebuilt.vertex_count(), 4);
  assert_eq!(rebuilt.triangle_count(), 4);
  assert!((rebuilt.signed_volume() - mesh.signed_volume()).abs() < 1e-12);
}

#[test]
fn test_builder_skips_degenerate_triangles() {
  let mut builder = MeshBuilder::new();
  let p = Vec3::new(1.0, 1.0, 1.0);
  builder.add_triangle(p, p, Vec3::ZERO);
  builder.add_triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
  assert_eq!(builder.degenerate_count(), 1);
  assert_eq!(builder.triangle_count(), 1);
}

#[test]
fn test_closure_collector_counts_triangles() {
  let mut count = 0;
  tetrahedron().emit(&mut FnCollector(|_, _, _| count += 1));
  assert_eq!(count, 4);
}

#[test]
fn test_triangle_normal() {
  let n = triangle_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
  assert!((n - Vec3::Z).length() < 1e-6);
  assert_eq!(triangle_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0), Vec3::ZERO);
}
