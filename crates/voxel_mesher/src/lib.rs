//! voxel_mesher - parallel isosurface meshing for large voxel grids
//!
//! Converts a 3D grid (boolean occupancy or scalar samples) into one closed,
//! consistently wound triangle mesh. The grid is split into blocks that are
//! meshed and simplified independently on a worker pool, then welded back
//! together along their seams.
//!
//! # Features
//!
//! - **Marching Cubes / Tetrahedra**: Per-block isosurface extraction with
//!   optional Gaussian pre-smoothing
//! - **Edge-Collapse Decimation**: Manifold-preserving simplification of flat
//!   regions with a pluggable collapse policy
//! - **Seam Welding**: Block boundary vertices are keyed by lattice edge and
//!   never move, so blocks stitch without cracks
//! - **Shell Filtering**: Keep the largest connected shells by enclosed
//!   volume
//!
//! # Example
//!
//! ```ignore
//! use voxel_mesher::{generate_mesh, DenseGrid, GridBounds, MeshingConfig};
//!
//! let mut grid = DenseGrid::new([64, 64, 64], GridBounds::default());
//! grid.fill_box([16, 16, 16], [47, 47, 47], true);
//!
//! let output = generate_mesh(&grid, &MeshingConfig::default())?;
//! println!("{} triangles in {} us", output.mesh.triangle_count(), output.stats.total_us);
//! ```

pub mod config;
pub mod constants;
pub mod edge_table;
pub mod error;
pub mod grid;
pub mod partition;
pub mod types;

// Re-export commonly used items
pub use config::MeshingConfig;
pub use constants::{coord_to_index, index_to_coord, CORNER_OFFSETS};
pub use error::{MeshError, Result};
pub use grid::{DenseGrid, GridBounds, VoxelGrid};
pub use partition::{partition_blocks, Block};
pub use types::{FnCollector, Mesh, MeshBuilder, MinMaxAABB, TriangleCollector};

// Isosurface extraction
pub mod extract;
pub use extract::{extract_block, Algorithm, BlockMesh, ExtractParams, VertexKey};

// Edge-collapse decimation
pub mod decimate;
pub use decimate::{
  decimate, CollapsePolicy, DecimationParams, DecimationStats, FlatnessPolicy, GridGuard,
  WingedEdgeMesh,
};

// Connected shell filtering
pub mod shells;
pub use shells::{extract_shells, extract_shells_with, find_shells, Shell, ShellFilter, ShellMode, ShellOutput};

// Worker pool for block tasks
pub mod threading;
pub use threading::{TaskFailure, TaskOutcome, WorkerPool};

// Block pipeline
pub mod pipeline;
pub use pipeline::{generate_into, generate_mesh, PipelineOutput, PipelineStats};
