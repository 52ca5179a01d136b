//! Connected-component (shell) discovery, volume measurement and filtering.
//!
//! # Selection
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SHELL SELECTION                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. Flood fill over shared edges from the lowest unvisited face.        │
//! │  2. Volume per shell: Σ v0 · (v1 × v2) / 6 in f64.                      │
//! │       > 5 shells (or forced)  → worker pool                             │
//! │       otherwise               → sequential                              │
//! │  3. Drop shells below min_volume.                                       │
//! │  4. Stable sort by volume, largest first (ties keep discovery order).   │
//! │  5. Keep the first max_shells.                                          │
//! │  6. Copy retained faces, shell by shell, faces ascending.               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Running the selection again on its own output reproduces it exactly.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::constants::PARALLEL_SHELL_THRESHOLD;
use crate::error::Result;
use crate::threading::WorkerPool;
use crate::types::{signed_volume_of, Mesh, MinMaxAABB};

/// One face-connected component of a mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Shell {
  /// Discovery index.
  pub id: usize,

  /// Lowest face index in the shell; the flood fill started here.
  pub start_face: usize,
  pub face_count: usize,

  /// Face indices, ascending.
  pub faces: Vec<usize>,

  /// Signed enclosed volume.
  pub volume: f64,
  pub bounds: MinMaxAABB,
}

/// Which shells survive extraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShellFilter {
  /// Keep at most this many shells, largest first.
  pub max_shells: usize,

  /// Shells with a smaller volume are always discarded.
  pub min_volume: f64,
}

impl ShellFilter {
  pub fn new(max_shells: usize, min_volume: f64) -> Self {
    Self {
      max_shells,
      min_volume,
    }
  }

  /// Keep only the single largest shell.
  pub fn largest() -> Self {
    Self::new(1, 0.0)
  }
}

/// Execution strategy for volume evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShellMode {
  /// Parallel above [`PARALLEL_SHELL_THRESHOLD`] shells, sequential otherwise.
  #[default]
  Auto,
  Sequential,
  Parallel,
}

/// Result of [`extract_shells`].
#[derive(Clone, Debug)]
pub struct ShellOutput {
  /// Faces of the retained shells, vertices compacted in first-use order.
  pub mesh: Mesh,

  /// Retained shells in output order. Face indices refer to the input mesh.
  pub retained: Vec<Shell>,

  /// Shells below the minimum volume.
  pub discarded: usize,

  /// Shells above the minimum volume but beyond the count cap.
  pub over_cap: usize,

  /// Shells whose volume evaluation failed; they are not retained.
  pub failed: usize,

  /// Shells found in the input.
  pub total: usize,
}

// =============================================================================
// Discovery
// =============================================================================

/// Face-connected components of `mesh`, with volumes and bounds.
pub fn find_shells(mesh: &Mesh) -> Vec<Shell> {
  let mut shells = discover(mesh);
  for shell in &mut shells {
    let (volume, bounds) = measure(mesh, &shell.faces);
    shell.volume = volume;
    shell.bounds = bounds;
  }
  shells
}

/// Flood fill over edge adjacency. Volumes are left at zero.
fn discover(mesh: &Mesh) -> Vec<Shell> {
  let mut edge_faces: HashMap<(u32, u32), SmallVec<[u32; 2]>> = HashMap::with_capacity(mesh.faces.len() * 3 / 2);
  for (f, face) in mesh.faces.iter().enumerate() {
    for i in 0..3 {
      let (a, b) = (face[i], face[(i + 1) % 3]);
      edge_faces.entry((a.min(b), a.max(b))).or_default().push(f as u32);
    }
  }

  let mut visited = vec![false; mesh.faces.len()];
  let mut shells = Vec::new();
  let mut stack = Vec::new();
  for start in 0..mesh.faces.len() {
    if visited[start] {
      continue;
    }
    visited[start] = true;
    stack.push(start);

    let mut faces = Vec::new();
    while let Some(f) = stack.pop() {
      faces.push(f);
      let face = mesh.faces[f];
      for i in 0..3 {
        let (a, b) = (face[i], face[(i + 1) % 3]);
        let Some(neighbors) = edge_faces.get(&(a.min(b), a.max(b))) else {
          continue;
        };
        for &g in neighbors {
          if !visited[g as usize] {
            visited[g as usize] = true;
            stack.push(g as usize);
          }
        }
      }
    }
    faces.sort_unstable();

    shells.push(Shell {
      id: shells.len(),
      start_face: start,
      face_count: faces.len(),
      faces,
      volume: 0.0,
      bounds: MinMaxAABB::empty(),
    });
  }
  shells
}

fn measure(mesh: &Mesh, faces: &[usize]) -> (f64, MinMaxAABB) {
  let mut bounds = MinMaxAABB::empty();
  for &f in faces {
    for p in mesh.face_positions(f) {
      bounds.encapsulate(p.to_array());
    }
  }
  (signed_volume_of(mesh, faces.iter().copied()), bounds)
}

// =============================================================================
// Extraction
// =============================================================================

/// Keep the shells of `mesh` selected by `filter`.
///
/// `threads` sizes a worker pool built only when volumes are evaluated in
/// parallel (`0` = one per core). Sequential and parallel evaluation select
/// the same shells.
pub fn extract_shells(mesh: &Mesh, filter: &ShellFilter, mode: ShellMode, threads: usize) -> Result<ShellOutput> {
  select(mesh, filter, mode, None, threads)
}

/// [`extract_shells`] evaluating parallel volumes on an existing pool.
pub fn extract_shells_with(
  mesh: &Mesh,
  filter: &ShellFilter,
  mode: ShellMode,
  pool: &WorkerPool,
) -> Result<ShellOutput> {
  select(mesh, filter, mode, Some(pool), pool.num_threads())
}

fn select(
  mesh: &Mesh,
  filter: &ShellFilter,
  mode: ShellMode,
  pool: Option<&WorkerPool>,
  threads: usize,
) -> Result<ShellOutput> {
  let _span = tracing::info_span!("extract_shells", faces = mesh.triangle_count()).entered();

  let mut shells = discover(mesh);
  let total = shells.len();
  let parallel = match mode {
    ShellMode::Auto => total > PARALLEL_SHELL_THRESHOLD,
    ShellMode::Sequential => false,
    ShellMode::Parallel => true,
  };

  let mut failed = 0;
  if parallel {
    let owned;
    let pool = match pool {
      Some(pool) => pool,
      None => {
        owned = WorkerPool::new(threads)?;
        &owned
      }
    };
    let faces: Vec<&[usize]> = shells.iter().map(|s| s.faces.as_slice()).collect();
    let outcomes = pool.run(faces, |faces| measure(mesh, faces));
    let mut measured = Vec::with_capacity(total);
    for (mut shell, outcome) in shells.into_iter().zip(outcomes) {
      match outcome.result {
        Ok((volume, bounds)) => {
          shell.volume = volume;
          shell.bounds = bounds;
          measured.push(shell);
        }
        Err(failure) => {
          tracing::warn!(shell = shell.id, error = %failure.message, "shell volume evaluation failed");
          failed += 1;
        }
      }
    }
    shells = measured;
  } else {
    for shell in &mut shells {
      let (volume, bounds) = measure(mesh, &shell.faces);
      shell.volume = volume;
      shell.bounds = bounds;
    }
  }

  let measured = shells.len();
  shells.retain(|s| s.volume >= filter.min_volume);
  let discarded = measured - shells.len();

  // Stable: equal volumes keep discovery order.
  shells.sort_by(|a, b| b.volume.total_cmp(&a.volume));
  let over_cap = shells.len().saturating_sub(filter.max_shells);
  shells.truncate(filter.max_shells);

  let out = mesh.subset(shells.iter().flat_map(|s| s.faces.iter().copied()));

  tracing::debug!(
    total,
    retained = shells.len(),
    discarded,
    over_cap,
    parallel,
    "selected shells"
  );

  Ok(ShellOutput {
    mesh: out,
    retained: shells,
    discarded,
    over_cap,
    failed,
    total,
  })
}
