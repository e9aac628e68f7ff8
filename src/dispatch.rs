//! Static parallel batch dispatch with per-worker result slots.
//!
//! The task list is split once, up front, into contiguous chunks whose sizes
//! differ by at most one. Each non-empty chunk is moved into its own
//! `spawn_blocking` worker, which converts its files in order and returns a
//! [`WorkerResult`]. The dispatcher waits for every worker and sums the
//! results. Workers share nothing mutable: slot `i` is worker `i`'s return
//! value, collected in spawn order by `join_all`.
//!
//! ```text
//! tasks [t0 t1 t2 t3 t4 t5 t6 t7 t8 t9]   workers = 3
//!        └──── w0 ────┘└─ w1 ─┘└─ w2 ─┘   sizes   = [4, 3, 3]
//! ```

use crate::config::BatchConfig;
use crate::convert::convert_task;
use crate::error::FileError;
use crate::output::{BatchSummary, FileFailure, FileTask, WorkerResult};
use crate::pipeline::document::{resolve_backend, DocumentBackend};
use futures::future::join_all;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A contiguous slice of the task list, owned by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub worker: usize,
    pub tasks: Vec<FileTask>,
}

/// Everything a worker needs besides its chunk. Shared read-only.
pub struct WorkerContext {
    pub config: BatchConfig,
    /// Batch root, used for mirrored output paths. None in single-file mode.
    pub root: Option<PathBuf>,
    pub backend: Arc<dyn DocumentBackend>,
}

impl WorkerContext {
    /// Resolve the document backend once for the whole batch.
    pub fn new(config: BatchConfig, root: Option<PathBuf>) -> Self {
        let backend = resolve_backend(&config);
        Self {
            config,
            root,
            backend,
        }
    }
}

/// Sizes of the `max(workers, 1)` chunks for `total` items: the first
/// `total % workers` chunks get one extra. Includes zero-sized chunks.
pub fn chunk_sizes(total: usize, workers: usize) -> Vec<usize> {
    let n = workers.max(1);
    let base = total / n;
    let remainder = total % n;
    (0..n).map(|i| base + usize::from(i < remainder)).collect()
}

/// Split `items` into at most `workers` contiguous, non-empty groups.
///
/// `workers <= 1` yields a single group. Concatenating the groups in order
/// reproduces `items` exactly.
pub fn partition<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    if workers <= 1 {
        return vec![items];
    }

    let sizes = chunk_sizes(items.len(), workers);
    let mut iter = items.into_iter();
    sizes
        .into_iter()
        .filter(|&n| n > 0)
        .map(|n| iter.by_ref().take(n).collect())
        .collect()
}

/// [`partition`] with worker indices attached.
pub fn make_chunks(tasks: Vec<FileTask>, workers: usize) -> Vec<Chunk> {
    partition(tasks, workers)
        .into_iter()
        .enumerate()
        .map(|(worker, tasks)| Chunk { worker, tasks })
        .collect()
}

/// Number of workers [`dispatch`] will spawn for `total` tasks.
pub fn worker_count(total: usize, workers: usize) -> usize {
    total.min(workers.max(1))
}

/// Run every task across `ctx.config.workers` workers and wait for all.
///
/// Never fails: per-file errors are recorded in the worker results. An empty
/// task list returns `(0, 0)` without spawning anything.
pub async fn dispatch(tasks: Vec<FileTask>, ctx: WorkerContext) -> BatchSummary {
    let start = Instant::now();
    if tasks.is_empty() {
        return BatchSummary::empty();
    }

    let chunks = make_chunks(tasks, ctx.config.workers);
    let sizes: Vec<usize> = chunks.iter().map(|c| c.tasks.len()).collect();
    info!(
        "Dispatching {} files across {} worker(s), chunk sizes {:?}",
        sizes.iter().sum::<usize>(),
        sizes.len(),
        sizes
    );

    let ctx = Arc::new(ctx);
    let handles: Vec<_> = chunks
        .into_iter()
        .map(|chunk| {
            let ctx = Arc::clone(&ctx);
            tokio::task::spawn_blocking(move || run_chunk(chunk, &ctx))
        })
        .collect();

    let slots: Vec<WorkerResult> = join_all(handles)
        .await
        .into_iter()
        .enumerate()
        .map(|(worker, joined)| match joined {
            Ok(result) => result,
            Err(e) => {
                error!("Worker {} terminated abnormally: {}", worker, e);
                WorkerResult {
                    worker,
                    succeeded: 0,
                    attempted: sizes[worker],
                    failures: Vec::new(),
                }
            }
        })
        .collect();

    BatchSummary::from_workers(slots, start.elapsed().as_millis() as u64)
}

/// Convert one chunk sequentially. Runs on a blocking worker thread.
pub fn run_chunk(chunk: Chunk, ctx: &WorkerContext) -> WorkerResult {
    let worker = chunk.worker;
    let total = chunk.tasks.len();
    let callback = ctx.config.progress_callback.as_ref();
    let mut result = WorkerResult::new(worker);
    debug!("Worker {} started with {} files", worker, total);

    for task in &chunk.tasks {
        result.attempted += 1;
        if let Some(cb) = callback {
            cb.on_file_start(worker, task);
        }
        info!(
            "[worker {}] Processing {} file ({}/{}): {}",
            worker,
            task.category,
            result.attempted,
            total,
            task.path.display()
        );

        match convert_contained(task, ctx) {
            Ok(output) => {
                result.succeeded += 1;
                info!(
                    "[worker {}] Converted: {} \u{2192} {}",
                    worker,
                    task.path.display(),
                    output.display()
                );
                if let Some(cb) = callback {
                    cb.on_file_complete(worker, task, &output);
                }
            }
            Err(e) => {
                warn!("[worker {}] Error converting {}", worker, e);
                if let Some(cb) = callback {
                    cb.on_file_error(worker, task, &e);
                }
                result.failures.push(FileFailure {
                    path: task.path.clone(),
                    error: e,
                });
            }
        }
    }

    debug!(
        "Worker {} finished: {}/{} succeeded",
        worker, result.succeeded, result.attempted
    );
    if let Some(cb) = callback {
        cb.on_worker_complete(&result);
    }
    result
}

/// [`convert_task`] with backend panics turned into a per-file failure.
fn convert_contained(task: &FileTask, ctx: &WorkerContext) -> Result<PathBuf, FileError> {
    panic::catch_unwind(AssertUnwindSafe(|| convert_task(task, ctx))).unwrap_or_else(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(FileError::Conversion {
            path: task.path.clone(),
            detail: format!("converter panicked: {detail}"),
        })
    })
}
