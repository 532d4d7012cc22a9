use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    rows_scanned: AtomicU64,
    duplicate_keys: AtomicU64,
    rows_ignored: AtomicU64,
    query_retries: AtomicU64,
    runs_completed: AtomicU64,
    runs_aborted: AtomicU64,
}

/// Counters for on-start runs. Cheap to clone; clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub rows_scanned: u64,
    pub duplicate_keys: u64,
    pub rows_ignored: u64,
    pub query_retries: u64,
    pub runs_completed: u64,
    pub runs_aborted: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_rows_scanned(&self, count: u64) {
        self.inner.rows_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_duplicate_keys(&self, count: u64) {
        self.inner.duplicate_keys.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_rows_ignored(&self, count: u64) {
        self.inner.rows_ignored.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_query_retries(&self) {
        self.inner.query_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_runs_completed(&self) {
        self.inner.runs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_runs_aborted(&self) {
        self.inner.runs_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_scanned: self.inner.rows_scanned.load(Ordering::Relaxed),
            duplicate_keys: self.inner.duplicate_keys.load(Ordering::Relaxed),
            rows_ignored: self.inner.rows_ignored.load(Ordering::Relaxed),
            query_retries: self.inner.query_retries.load(Ordering::Relaxed),
            runs_completed: self.inner.runs_completed.load(Ordering::Relaxed),
            runs_aborted: self.inner.runs_aborted.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
