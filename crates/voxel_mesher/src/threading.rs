//! Fixed-size worker pool draining one shared FIFO queue.
//!
//! Both parallel phases (block meshing and shell volume evaluation) run
//! through [`WorkerPool::run`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            WORKER POOL                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  tasks ──► [ crossbeam FIFO ] ──► worker 0 ─┐                           │
//! │                              ├──► worker 1 ─┼──► [ results ] ──► sort   │
//! │                              └──► worker N ─┘                           │
//! │                                                                         │
//! │  Each task is dequeued exactly once. A panicking task is caught and     │
//! │  reported as a failure; its worker moves on to the next task.           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pool is a dedicated rayon pool, so work never lands on the global
//! pool of the host application.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crossbeam_channel::unbounded;

use crate::error::Result;

/// A task that panicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskFailure {
  pub message: String,
}

/// Result of one task, tagged with its submission index.
#[derive(Debug)]
pub struct TaskOutcome<R> {
  pub index: usize,
  pub result: std::result::Result<R, TaskFailure>,
}

/// Fixed-size pool of worker threads.
pub struct WorkerPool {
  pool: rayon::ThreadPool,
  threads: usize,
}

impl WorkerPool {
  /// Create a pool of `max(threads, 1)` workers; `0` means one per core.
  pub fn new(threads: usize) -> Result<Self> {
    let threads = if threads == 0 {
      rayon::current_num_threads()
    } else {
      threads
    }
    .max(1);

    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(threads)
      .thread_name(|i| format!("mesher-{}", i))
      .build()?;

    Ok(Self { pool, threads })
  }

  pub fn num_threads(&self) -> usize {
    self.threads
  }

  /// Run `work` over every task and wait for all of them.
  ///
  /// Outcomes come back in submission order regardless of which worker ran
  /// which task.
  pub fn run<T, R, F>(&self, tasks: Vec<T>, work: F) -> Vec<TaskOutcome<R>>
  where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
  {
    let total = tasks.len();
    if total == 0 {
      return Vec::new();
    }

    let (task_tx, task_rx) = unbounded::<(usize, T)>();
    for task in tasks.into_iter().enumerate() {
      // The receiver outlives this loop, so sending cannot fail.
      let _ = task_tx.send(task);
    }
    drop(task_tx);

    let (result_tx, result_rx) = unbounded::<TaskOutcome<R>>();
    let workers = self.threads.min(total);
    let work = &work;

    self.pool.scope(|scope| {
      for _ in 0..workers {
        let task_rx = task_rx.clone();
        let result_tx = result_tx.clone();
        scope.spawn(move |_| {
          while let Ok((index, task)) = task_rx.recv() {
            let result = catch_unwind(AssertUnwindSafe(|| work(task))).map_err(|payload| TaskFailure {
              message: panic_message(payload.as_ref()),
            });
            let _ = result_tx.send(TaskOutcome { index, result });
          }
        });
      }
    });
    drop(result_tx);

    let mut outcomes: Vec<TaskOutcome<R>> = result_rx.into_iter().collect();
    outcomes.sort_by_key(|o| o.index);
    outcomes
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}

// =============================================================================
// Tests
// =============================================================================
