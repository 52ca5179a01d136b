use std::collections::HashSet;

use super::*;

#[test]
fn test_coord_to_index_roundtrip() {
  let dims = [3, 5, 4];
  for x in 0..dims[0] {
    for y in 0..dims[1] {
      for z in 0..dims[2] {
        let idx = coord_to_index(x, y, z, dims);
        assert_eq!(
          (x, y, z),
          index_to_coord(idx, dims),
          "Roundtrip failed for ({}, {}, {})",
          x,
          y,
          z
        );
      }
    }
  }
}

#[test]
fn test_z_is_innermost() {
  let dims = [4, 4, 4];
  assert_eq!(coord_to_index(0, 0, 1, dims), 1);
  assert_eq!(coord_to_index(0, 1, 0, dims), 4);
  assert_eq!(coord_to_index(1, 0, 0, dims), 16);
}

#[test]
fn test_corner_offsets() {
  assert_eq!(CORNER_OFFSETS[0], [0, 0, 0]);
  assert_eq!(CORNER_OFFSETS[6], [1, 1, 1]);

  // Bottom face (y = 0) holds corners 0..4, top face holds 4..8.
  for corner in 0..4 {
    assert_eq!(CORNER_OFFSETS[corner][1], 0);
    assert_eq!(CORNER_OFFSETS[corner + 4][1], 1);
    // Top corners sit directly above their bottom counterparts.
    assert_eq!(CORNER_OFFSETS[corner][0], CORNER_OFFSETS[corner + 4][0]);
    assert_eq!(CORNER_OFFSETS[corner][2], CORNER_OFFSETS[corner + 4][2]);
  }
}

#[test]
fn test_lattice_ids_are_unique_over_padded_range() {
  let extents = [3, 2, 4];
  let mut seen = HashSet::new();
  for x in -1..=extents[0] as i64 {
    for y in -1..=extents[1] as i64 {
      for z in -1..=extents[2] as i64 {
        assert!(seen.insert(lattice_id([x, y, z], extents)));
      }
    }
  }
  assert_eq!(seen.len(), 5 * 4 * 6);
}

#[test]
fn test_epsilon_is_positive() {
  assert!(ISO_EPSILON > 0.0);
  assert!(INSIDE_SAMPLE < 0.0 && OUTSIDE_SAMPLE > 0.0);
}
