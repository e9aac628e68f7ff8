//! Data types flowing through a batch: tasks in, per-worker results out.

use crate::catalog::Category;
use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One eligible input file and its conversion route.
///
/// Created during enumeration and consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    pub category: Category,
}

impl FileTask {
    pub fn new(path: impl Into<PathBuf>, category: Category) -> Self {
        Self {
            path: path.into(),
            category,
        }
    }
}

/// A file that failed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: FileError,
}

/// What one worker reports after its chunk is done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResult {
    /// Index of the worker (and of its result slot).
    pub worker: usize,
    /// Files converted and written.
    pub succeeded: usize,
    /// Files the worker was responsible for.
    pub attempted: usize,
    /// One entry per failed file, in chunk order.
    pub failures: Vec<FileFailure>,
}

impl WorkerResult {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Self::default()
        }
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Aggregate of every worker's result, computed after all workers joined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub attempted: usize,
    /// Per-worker results, indexed by worker.
    pub workers: Vec<WorkerResult>,
    pub total_duration_ms: u64,
}

impl BatchSummary {
    /// The `(0, 0)` summary of a batch with no eligible files.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sum the per-worker slots. Slots must already be ordered by worker index.
    pub fn from_workers(workers: Vec<WorkerResult>, total_duration_ms: u64) -> Self {
        let succeeded = workers.iter().map(|w| w.succeeded).sum();
        let attempted = workers.iter().map(|w| w.attempted).sum();
        Self {
            succeeded,
            attempted,
            workers,
            total_duration_ms,
        }
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    /// True when every attempted file succeeded (vacuously true for zero files).
    pub fn is_success(&self) -> bool {
        self.succeeded == self.attempted
    }

    /// Success percentage, or None when nothing was attempted.
    pub fn success_rate(&self) -> Option<f64> {
        (self.attempted > 0).then(|| self.succeeded as f64 / self.attempted as f64 * 100.0)
    }

    /// Every failure across all workers, in worker order.
    pub fn failures(&self) -> impl Iterator<Item = &FileFailure> {
        self.workers.iter().flat_map(|w| w.failures.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(idx: usize, succeeded: usize, attempted: usize) -> WorkerResult {
        WorkerResult {
            worker: idx,
            succeeded,
            attempted,
            failures: Vec::new(),
        }
    }

    #[test]
    fn aggregate_sums_slots() {
        let s = BatchSummary::from_workers(vec![worker(0, 4, 4), worker(1, 2, 3), worker(2, 3, 3)], 12);
        assert_eq!(s.succeeded, 9);
        assert_eq!(s.attempted, 10);
        assert_eq!(s.failed(), 1);
        assert!(!s.is_success());
        assert_eq!(s.success_rate(), Some(90.0));
    }

    #[test]
    fn empty_summary_is_success_without_rate() {
        let s = BatchSummary::empty();
        assert_eq!((s.succeeded, s.attempted), (0, 0));
        assert!(s.is_success());
        assert_eq!(s.success_rate(), None);
    }

    #[test]
    fn failures_flatten_in_worker_order() {
        let mut w0 = worker(0, 0, 1);
        w0.failures.push(FileFailure {
            path: "a.pdf".into(),
            error: FileError::NotFound {
                path: "a.pdf".into(),
            },
        });
        let mut w1 = worker(1, 0, 1);
        w1.failures.push(FileFailure {
            path: "b.pdf".into(),
            error: FileError::UnsupportedType {
                path: "b.pdf".into(),
            },
        });
        let s = BatchSummary::from_workers(vec![w0, w1], 0);
        let paths: Vec<_> = s.failures().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
    }

    #[test]
    fn summary_serialises_to_json() {
        let s = BatchSummary::from_workers(vec![worker(0, 1, 1)], 5);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["workers"][0]["attempted"], 1);
    }
}
