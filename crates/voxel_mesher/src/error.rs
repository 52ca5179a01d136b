//! Error type shared by every fallible meshing stage.

use thiserror::Error;

/// Errors raised by the meshing pipeline.
///
/// Index and range variants describe programmer errors (bad block bounds,
/// malformed meshes) and are reported immediately; they are never retried.
#[derive(Debug, Error)]
pub enum MeshError {
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("block {min:?}..={max:?} lies outside cell extents {extents:?}")]
  BlockOutOfRange {
    min: [usize; 3],
    max: [usize; 3],
    extents: [usize; 3],
  },

  #[error("grid extents {extents:?} need {expected} samples, got {actual}")]
  ExtentsMismatch {
    extents: [usize; 3],
    expected: usize,
    actual: usize,
  },

  #[error("face {face} references vertex {index}, mesh has {vertex_count} vertices")]
  IndexOutOfRange {
    face: usize,
    index: u32,
    vertex_count: usize,
  },

  #[error("edge {edge} has {faces} incident faces")]
  NonManifold { edge: u32, faces: usize },

  #[error("failed to build worker pool: {0}")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, MeshError>;
