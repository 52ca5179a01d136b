use glam::Vec3;

use super::*;

#[test]
fn test_new_grid_is_outside() {
  let grid = DenseGrid::new([2, 3, 4], GridBounds::default());
  assert_eq!(grid.extents(), [2, 3, 4]);
  assert_eq!(grid.inside_count(), 0);
  assert_eq!(grid.sample(1, 2, 3), OUTSIDE_SAMPLE);
}

#[test]
fn test_fill_box_marks_inclusive_range() {
  let mut grid = DenseGrid::new([6, 6, 6], GridBounds::default());
  grid.fill_box([1, 1, 1], [2, 3, 4], true);
  assert_eq!(grid.inside_count(), 2 * 3 * 4);
  assert!(grid.state(1, 1, 1));
  assert!(grid.state(2, 3, 4));
  assert!(!grid.state(3, 3, 4));
  assert_eq!(grid.sample(2, 2, 2), INSIDE_SAMPLE);
}

#[test]
fn test_fill_box_clamps_to_extents() {
  let mut grid = DenseGrid::new([3, 3, 3], GridBounds::default());
  grid.fill_box([1, 1, 1], [10, 10, 10], true);
  assert_eq!(grid.inside_count(), 8);
}

#[test]
fn test_from_samples_checks_length() {
  let result = DenseGrid::from_samples([2, 2, 2], GridBounds::default(), vec![0.0; 7]);
  match result {
    Err(MeshError::ExtentsMismatch {
      expected, actual, ..
    }) => {
      assert_eq!(expected, 8);
      assert_eq!(actual, 7);
    }
    other => panic!("unexpected result: {:?}", other.map(|g| g.extents())),
  }
}

#[test]
fn test_scalar_samples_drive_state() {
  let grid = DenseGrid::from_fn([4, 1, 1], GridBounds::default(), |x, _, _| x as f32 - 1.5);
  assert!(grid.state(0, 0, 0));
  assert!(grid.state(1, 0, 0));
  assert!(!grid.state(2, 0, 0));
}

#[test]
fn test_world_mapping_uses_voxel_centers() {
  let bounds = GridBounds::new(Vec3::new(10.0, 0.0, -2.0), 0.5);
  let center = bounds.sample_to_world(Vec3::new(0.0, 1.0, 2.0));
  assert_eq!(center, Vec3::new(10.25, 0.75, -0.75));
  assert_eq!(bounds.world_to_voxel(center), [0, 1, 2]);
  assert_eq!(bounds.world_max([4, 2, 2]), Vec3::new(12.0, 1.0, -1.0));
}

#[test]
fn test_is_inside_at_world_position() {
  let mut grid = DenseGrid::new([4, 4, 4], GridBounds::new(Vec3::ZERO, 2.0));
  grid.set_state(1, 1, 1, true);
  assert!(grid.is_inside_at(Vec3::splat(3.0)));
  assert!(!grid.is_inside_at(Vec3::splat(1.0)));
  assert!(!grid.is_inside_at(Vec3::splat(-1.0)));
  assert!(!grid.is_inside_at(Vec3::splat(100.0)));
}
