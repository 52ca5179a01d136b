//! Voxel Meshing Pipeline
//!
//! Turns a [`VoxelGrid`](crate::grid::VoxelGrid) into one closed triangle
//! mesh, block by block, on a worker pool.
//!
//! ```text
//! ┌───────────┐     ┌────────┐     ┌────────┐     ┌──────────┐     ┌────────┐
//! │ Partition ├────►│ Blocks ├────►│ Budget ├────►│ Assemble ├────►│ Shells │
//! └───────────┘     └────────┘     └────────┘     └──────────┘     └────────┘
//!       │               │              │               │               │
//!    Block[]       BlockMesh[]    BlockMesh[]        Mesh       PipelineOutput
//!                (extract+decim) (relaxed error)  (seams welded)  (filtered)
//! ```
//!
//! # Stages
//!
//! 1. **Partition**: tiles the cell range into near-equal blocks
//! 2. **Blocks**: extracts and decimates each block in parallel
//! 3. **Budget**: re-decimates with a looser error bound while the mesh is
//!    over `max_triangles`
//! 4. **Assemble**: concatenates block meshes, welding seam vertices, and
//!    optionally decimates the welded mesh again
//! 5. **Shells**: keeps the largest connected shells when a filter is set

pub mod assemble;
pub mod blocks;
pub mod process;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use assemble::{assemble, Assembly};
pub use blocks::{decimate_block, decimate_seams, redecimate_blocks, run_blocks, BlockRun};
pub use process::{generate_into, generate_mesh};
pub use types::{PipelineOutput, PipelineStats};
