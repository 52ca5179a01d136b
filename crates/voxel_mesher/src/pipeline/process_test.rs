use glam::Vec3;

use super::*;
use crate::extract::Algorithm;
use crate::grid::{DenseGrid, GridBounds};
use crate::pipeline::test_utils::*;
use crate::shells::{ShellFilter, ShellMode};

fn exact() -> MeshingConfig {
  MeshingConfig::default().with_smoothing_width(0.0)
}

/// Grid whose samples panic past a given X index.
struct FaultyGrid {
  inner: DenseGrid,
  fault_x: usize,
}

impl VoxelGrid for FaultyGrid {
  fn extents(&self) -> [usize; 3] {
    self.inner.extents()
  }

  fn bounds(&self) -> GridBounds {
    self.inner.bounds()
  }

  fn state(&self, x: usize, y: usize, z: usize) -> bool {
    self.inner.state(x, y, z)
  }

  fn sample(&self, x: usize, y: usize, z: usize) -> f32 {
    if x >= self.fault_x {
      panic!("corrupt sample at x = {}", x);
    }
    self.inner.sample(x, y, z)
  }
}

// =============================================================================
// Seams
// =============================================================================

#[test]
fn test_blocked_cube_matches_single_block() {
  let grid = cube_grid(4, 2);
  let whole = generate_mesh(&grid, &exact().with_block_size(100).without_decimation()).unwrap();

  for block_size in [3, 4] {
    let config = exact().with_block_size(block_size).without_decimation().with_threads(2);
    let out = generate_mesh(&grid, &config).unwrap();

    assert_eq!(out.stats.blocks_total, 27, "block size {}", block_size);
    assert_eq!(out.stats.blocks_dropped, 0);
    assert_eq!(out.mesh.triangle_count(), 188);
    assert_eq!(out.mesh.triangle_count(), whole.mesh.triangle_count());
    assert_eq!(out.mesh.vertex_count(), whole.mesh.vertex_count());
    assert_eq!(out.stats.vertices_welded, 120);
    assert_eq!(out.stats.degenerate_faces, 0);
    assert!((out.mesh.signed_volume() - whole.mesh.signed_volume()).abs() < 1e-3);
    assert!((out.mesh.signed_volume() - 58.6667).abs() < 1e-3);
    assert_closed_manifold(&out.mesh);
    assert_valid_triangles(&out.mesh);
  }

  assert_eq!(whole.stats.blocks_total, 1);
  assert_eq!(whole.stats.vertices_welded, 0);
}

#[test]
fn test_decimated_sphere_stays_closed() {
  let grid = sphere_grid(20, 7.0);
  let plain = generate_mesh(&grid, &exact().with_block_size(8).without_decimation()).unwrap();
  let out = generate_mesh(&grid, &exact().with_block_size(8)).unwrap();

  assert_eq!(out.stats.faces_extracted, plain.mesh.triangle_count());
  assert!(out.stats.faces_final < out.stats.faces_extracted);
  assert!(out.stats.decimation.collapses > 0);
  assert_eq!(out.stats.faces_decimated, out.stats.faces_final);
  assert_closed_manifold(&out.mesh);
  assert_valid_triangles(&out.mesh);

  let before = plain.mesh.signed_volume();
  let after = out.mesh.signed_volume();
  assert!((after - before).abs() / before < 0.02, "volume {} vs {}", after, before);
}

#[test]
fn test_tetrahedra_across_blocks() {
  let grid = cube_grid(3, 2);
  let config = exact()
    .with_algorithm(Algorithm::Tetrahedra)
    .with_block_size(3)
    .without_decimation();
  let out = generate_mesh(&grid, &config).unwrap();

  assert!(out.stats.vertices_welded > 0);
  assert_closed_manifold(&out.mesh);
  assert!(out.mesh.signed_volume() > 0.0);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_thread_count_does_not_change_output() {
  let grid = sphere_grid(18, 6.0);
  let base = MeshingConfig::default().with_block_size(6);

  let one = generate_mesh(&grid, &base.clone().with_threads(1)).unwrap();
  let many = generate_mesh(&grid, &base.with_threads(4)).unwrap();

  assert!(!one.mesh.is_empty());
  assert_eq!(one.mesh, many.mesh);
  assert_eq!(one.stats.decimation, many.stats.decimation);
  assert_eq!(one.stats.vertices_welded, many.stats.vertices_welded);
}

#[test]
fn test_noise_grid_is_closed_under_defaults() {
  let grid = noise_grid([12, 12, 12], 7, 0.5);
  let out = generate_mesh(&grid, &MeshingConfig::default().with_block_size(5)).unwrap();

  assert!(!out.mesh.is_empty());
  assert_closed_manifold(&out.mesh);
  assert_valid_triangles(&out.mesh);
}

// =============================================================================
// Shells and budget
// =============================================================================

#[test]
fn test_shell_filter_keeps_largest_cube() {
  let grid = two_cubes_grid();
  let config = exact().with_block_size(4).with_shell_filter(ShellFilter::largest());
  let out = generate_mesh(&grid, &config).unwrap();

  assert_eq!(out.stats.shells_found, 2);
  assert_eq!(out.stats.shells_discarded, 1);
  assert_eq!(out.shells.len(), 1);
  assert!(out.mesh.bounds().max[0] < 4.0);
  assert_eq!(out.stats.faces_final, out.mesh.triangle_count());
  assert_closed_manifold(&out.mesh);
}

#[test]
fn test_without_filter_every_shell_survives() {
  let grid = two_cubes_grid();
  let out = generate_mesh(&grid, &exact()).unwrap();

  assert!(out.shells.is_empty());
  assert_eq!(out.stats.shells_found, 0);
  assert!(out.mesh.bounds().max[0] > 6.0);
}

#[test]
fn test_triangle_budget_relaxes_error_bound() {
  let grid = sphere_grid(20, 7.0);
  let config = exact().with_block_size(8);
  let unbounded = generate_mesh(&grid, &config).unwrap();
  let out = generate_mesh(&grid, &config.with_max_triangles(100)).unwrap();

  assert_eq!(unbounded.stats.relaxation_attempts, 0);
  assert!((1..=3).contains(&out.stats.relaxation_attempts));
  assert!(out.stats.faces_final <= unbounded.stats.faces_final);
  assert_closed_manifold(&out.mesh);
}

#[test]
fn test_budget_already_met_skips_relaxation() {
  let grid = sphere_grid(20, 7.0);
  let out = generate_mesh(&grid, &exact().with_block_size(8).with_max_triangles(1_000_000)).unwrap();
  assert_eq!(out.stats.relaxation_attempts, 0);
}

#[test]
fn test_grid_guard_keeps_surface_closed() {
  let grid = sphere_grid(20, 7.0);
  let out = generate_mesh(&grid, &exact().with_block_size(8).with_grid_guard(true)).unwrap();

  assert!(out.stats.faces_final <= out.stats.faces_extracted);
  assert_closed_manifold(&out.mesh);
}

// =============================================================================
// Edge cases and failures
// =============================================================================

#[test]
fn test_empty_grid_yields_empty_mesh() {
  let grid = DenseGrid::new([6, 6, 6], GridBounds::default());
  let out = generate_mesh(&grid, &MeshingConfig::default().with_block_size(3)).unwrap();

  assert!(out.mesh.is_empty());
  assert_eq!(out.stats.blocks_total, 27);
  assert_eq!(out.stats.blocks_empty, 27);
  assert_eq!(out.stats.blocks_processed, 0);
}

#[test]
fn test_zero_extent_grid_has_no_blocks() {
  let grid = DenseGrid::new([0, 5, 5], GridBounds::default());
  let out = generate_mesh(&grid, &MeshingConfig::default()).unwrap();

  assert!(out.mesh.is_empty());
  assert_eq!(out.stats.blocks_total, 0);
}

#[test]
fn test_invalid_config_is_rejected() {
  let grid = cube_grid(2, 1);
  let result = generate_mesh(&grid, &MeshingConfig::default().with_block_size(0));
  assert!(matches!(result, Err(MeshError::InvalidConfig(_))));

  let flat = DenseGrid::new([4, 4, 4], GridBounds::new(Vec3::ZERO, 0.0));
  let result = generate_mesh(&flat, &MeshingConfig::default());
  assert!(matches!(result, Err(MeshError::InvalidConfig(_))));
}

#[test]
fn test_panicking_blocks_are_dropped() {
  let grid = FaultyGrid {
    inner: cube_grid(4, 2),
    fault_x: 7,
  };
  let out = generate_mesh(&grid, &exact().with_block_size(3).with_threads(2)).unwrap();
  let stats = &out.stats;

  assert!(stats.blocks_dropped >= 1);
  assert!(stats.blocks_dropped < stats.blocks_total);
  assert_eq!(
    stats.blocks_processed + stats.blocks_empty + stats.blocks_dropped,
    stats.blocks_total
  );
  assert!(!out.mesh.is_empty());
}

#[test]
fn test_generate_into_streams_final_triangles() {
  let grid = cube_grid(4, 2);
  let mut triangles: Vec<[Vec3; 3]> = Vec::new();
  let stats = generate_into(&grid, &exact().with_block_size(3), &mut triangles).unwrap();

  assert_eq!(triangles.len(), stats.faces_final);
  assert!(triangles.iter().all(|t| t.iter().all(|p| p.is_finite())));
}

#[test]
fn test_voxel_size_and_origin_place_mesh() {
  let mut grid = DenseGrid::new([6, 6, 6], GridBounds::new(Vec3::new(10.0, 0.0, 0.0), 2.0));
  grid.fill_box([2, 2, 2], [3, 3, 3], true);
  let out = generate_mesh(&grid, &exact().with_block_size(3)).unwrap();

  let bounds = out.mesh.bounds();
  assert!(bounds.min[0] > 10.0 + 2.0 * 2.0 - 2.0);
  assert!(bounds.max[0] < 10.0 + 2.0 * 4.0 + 2.0);
  assert_closed_manifold(&out.mesh);
}

#[test]
fn test_parallel_shell_stage_runs_on_run_pool() {
  let grid = two_cubes_grid();
  let base = exact().with_block_size(4).with_shell_filter(ShellFilter::new(2, 0.5));

  let seq = generate_mesh(&grid, &base.clone().with_shell_mode(ShellMode::Sequential)).unwrap();
  let par = generate_mesh(&grid, &base.with_threads(3).with_shell_mode(ShellMode::Parallel)).unwrap();

  assert_eq!(seq.shells, par.shells);
  assert_eq!(seq.mesh, par.mesh);
  assert_eq!(par.stats.shells_found, 2);
}

#[test]
fn test_seam_decimation_simplifies_block_borders() {
  let grid = sphere_grid(20, 7.0);
  let plain = generate_mesh(&grid, &exact().with_block_size(8).without_decimation()).unwrap();
  let blocked = generate_mesh(&grid, &exact().with_block_size(8)).unwrap();
  let joined = generate_mesh(&grid, &exact().with_block_size(8).with_seam_decimation(true)).unwrap();

  assert_eq!(blocked.stats.seam_collapses, 0);
  assert!(joined.stats.seam_collapses > 0);
  assert!(joined.stats.faces_final < blocked.stats.faces_final);
  assert_eq!(joined.stats.faces_decimated, blocked.stats.faces_decimated);
  assert_closed_manifold(&joined.mesh);
  assert_valid_triangles(&joined.mesh);

  let before = plain.mesh.signed_volume();
  let after = joined.mesh.signed_volume();
  assert!((after - before).abs() / before < 0.03, "volume {} vs {}", after, before);
}

#[test]
fn test_seam_decimation_respects_disabled_decimation() {
  let grid = cube_grid(4, 2);
  let config = exact().with_block_size(3).without_decimation().with_seam_decimation(true);
  let out = generate_mesh(&grid, &config).unwrap();

  assert_eq!(out.stats.seam_collapses, 0);
  assert_eq!(out.mesh.triangle_count(), 188);
}
