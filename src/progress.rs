//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as workers process their chunks.
//!
//! # Example
//!
//! ```rust
//! use edgequake_doc2md::{BatchConfig, BatchProgressCallback, FileTask};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, worker: usize, task: &FileTask, output: &Path) {
//!         let done = self.written.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("[w{worker}] {} -> {} ({done} so far)", task.path.display(), output.display());
//!     }
//! }
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { written: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::FileError;
use crate::output::{BatchSummary, FileTask, WorkerResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Called by the dispatcher and its workers as a batch runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// File-level methods are called concurrently from every worker thread.
/// Implementations must protect shared mutable state with appropriate
/// synchronisation primitives (e.g. `Mutex`, `AtomicUsize`).
pub trait BatchProgressCallback: Send + Sync {
    /// Called once, after enumeration, before any worker starts.
    ///
    /// # Arguments
    /// * `total_files` — number of eligible files
    /// * `workers`     — number of workers that will be spawned
    fn on_batch_start(&self, total_files: usize, workers: usize) {
        let _ = (total_files, workers);
    }

    /// Called before dispatch when several inputs map to one output path.
    ///
    /// Each entry is an output path and the inputs that will all be written
    /// to it; the last write wins. Not called when there are no collisions.
    fn on_collisions(&self, collisions: &[(PathBuf, Vec<PathBuf>)]) {
        let _ = collisions;
    }

    /// Called just before a worker converts a file.
    fn on_file_start(&self, worker: usize, task: &FileTask) {
        let _ = (worker, task);
    }

    /// Called when a file's Markdown has been written to `output`.
    fn on_file_complete(&self, worker: usize, task: &FileTask, output: &Path) {
        let _ = (worker, task, output);
    }

    /// Called when a file fails. The batch continues.
    fn on_file_error(&self, worker: usize, task: &FileTask, error: &FileError) {
        let _ = (worker, task, error);
    }

    /// Called when a worker has finished its whole chunk.
    fn on_worker_complete(&self, result: &WorkerResult) {
        let _ = result;
    }

    /// Called once after every worker has been joined.
    fn on_batch_complete(&self, summary: &BatchSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, DocumentKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        workers_done: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_file_start(&self, _worker: usize, _task: &FileTask) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _worker: usize, _task: &FileTask, _output: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _worker: usize, _task: &FileTask, _error: &FileError) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_worker_complete(&self, _result: &WorkerResult) {
            self.workers_done.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn task(name: &str) -> FileTask {
        FileTask::new(name, Category::Document(DocumentKind::Pdf))
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let t = task("a.pdf");
        cb.on_batch_start(1, 1);
        cb.on_collisions(&[("out/a.md".into(), vec!["x/a.pdf".into(), "y/a.pdf".into()])]);
        cb.on_file_start(0, &t);
        cb.on_file_complete(0, &t, Path::new("out/a.md"));
        cb.on_file_error(
            0,
            &t,
            &FileError::NotFound {
                path: "a.pdf".into(),
            },
        );
        cb.on_worker_complete(&WorkerResult::new(0));
        cb.on_batch_complete(&BatchSummary::empty());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let (a, b) = (task("a.pdf"), task("b.pdf"));

        tracker.on_file_start(0, &a);
        tracker.on_file_complete(0, &a, Path::new("out/a.md"));
        tracker.on_file_start(1, &b);
        tracker.on_file_error(
            1,
            &b,
            &FileError::Conversion {
                path: "b.pdf".into(),
                detail: "boom".into(),
            },
        );
        tracker.on_worker_complete(&WorkerResult::new(0));
        tracker.on_worker_complete(&WorkerResult::new(1));

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.workers_done.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn BatchProgressCallback>();
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10, 2);
    }
}
