use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use crate::processing::ProjectionStats;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { records: usize },
    ChunkStarted { start_record: usize, record_count: usize },
    ChunkFinished { changed_records: usize },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Forwards execution events to `tracing`: run boundaries at `info`, chunks at `debug`.
#[derive(Debug, Default)]
pub struct TracingExecutionObserver;

impl ExecutionObserver for TracingExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunStarted { records } => info!(records, "projection run started"),
            ExecutionEvent::ChunkStarted {
                start_record,
                record_count,
            } => debug!(start_record, record_count, "chunk started"),
            ExecutionEvent::ChunkFinished { changed_records } => {
                debug!(changed_records, "chunk finished")
            }
            ExecutionEvent::RunFinished { elapsed, metrics } => {
                info!(elapsed = ?elapsed, %metrics, "projection run finished")
            }
        }
    }
}

/// Real-time metrics for an execution run.
///
/// The engine updates these counters during execution; callers can snapshot them at any time.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    records_processed: AtomicU64,
    records_changed: AtomicU64,
    targets_written: AtomicU64,
    targets_missing: AtomicU64,
    codes_written: AtomicU64,
    chunks_started: AtomicU64,
    chunks_finished: AtomicU64,

    active_chunks: AtomicUsize,
    max_active_chunks: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            records_processed: AtomicU64::new(0),
            records_changed: AtomicU64::new(0),
            targets_written: AtomicU64::new(0),
            targets_missing: AtomicU64::new(0),
            codes_written: AtomicU64::new(0),
            chunks_started: AtomicU64::new(0),
            chunks_finished: AtomicU64::new(0),
            active_chunks: AtomicUsize::new(0),
            max_active_chunks: AtomicUsize::new(0),
        }
    }

    pub(crate) fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);

        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.records_processed.store(0, Ordering::SeqCst);
        self.records_changed.store(0, Ordering::SeqCst);
        self.targets_written.store(0, Ordering::SeqCst);
        self.targets_missing.store(0, Ordering::SeqCst);
        self.codes_written.store(0, Ordering::SeqCst);
        self.chunks_started.store(0, Ordering::SeqCst);
        self.chunks_finished.store(0, Ordering::SeqCst);
        self.active_chunks.store(0, Ordering::SeqCst);
        self.max_active_chunks.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_record_projected(&self, stats: &ProjectionStats, changed: bool) {
        let _ = self.records_processed.fetch_add(1, Ordering::SeqCst);
        if changed {
            let _ = self.records_changed.fetch_add(1, Ordering::SeqCst);
        }
        let _ = self
            .targets_written
            .fetch_add(stats.targets_written as u64, Ordering::SeqCst);
        let _ = self
            .targets_missing
            .fetch_add(stats.targets_missing as u64, Ordering::SeqCst);
        let _ = self
            .codes_written
            .fetch_add(stats.codes_written as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_chunk_start(&self) {
        let _ = self.chunks_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        update_max_usize(&self.max_active_chunks, now);
    }

    pub(crate) fn on_chunk_end(&self) {
        let _ = self.chunks_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self.active_chunks.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns));

        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            records_processed: self.records_processed.load(Ordering::SeqCst),
            records_changed: self.records_changed.load(Ordering::SeqCst),
            targets_written: self.targets_written.load(Ordering::SeqCst),
            targets_missing: self.targets_missing.load(Ordering::SeqCst),
            codes_written: self.codes_written.load(Ordering::SeqCst),
            chunks_started: self.chunks_started.load(Ordering::SeqCst),
            chunks_finished: self.chunks_finished.load(Ordering::SeqCst),
            max_active_chunks: self.max_active_chunks.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn update_max_usize(dst: &AtomicUsize, now: usize) {
    let _ = dst.fetch_max(now, Ordering::SeqCst);
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub records_processed: u64,
    pub records_changed: u64,
    pub targets_written: u64,
    pub targets_missing: u64,
    pub codes_written: u64,
    pub chunks_started: u64,
    pub chunks_finished: u64,
    pub max_active_chunks: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, records={} (changed={}), targets_written={}, targets_missing={}, codes_written={}, chunks={}/{}, max_active_chunks={}, elapsed={:?}",
            self.run_id,
            self.records_processed,
            self.records_changed,
            self.targets_written,
            self.targets_missing,
            self.codes_written,
            self.chunks_finished,
            self.chunks_started,
            self.max_active_chunks,
            self.elapsed
        )
    }
}
