//! Execution engine for projecting many records with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) projection of record batches on a dedicated thread pool
//! - Real-time metrics + observer hooks for monitoring
//!
//! Each record is projected independently with [`crate::processing::project_with_stats`]; the
//! output order always matches the input order.

mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::config::FieldMapping;
use crate::error::{FlattenError, FlattenResult};
use crate::processing::project_with_stats;
use crate::types::Record;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    TracingExecutionObserver,
};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of records per chunk.
    pub chunk_size: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            chunk_size: 256,
        }
    }
}

/// A configurable execution engine for batches of [`Record`]s.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`FlattenError::Configuration`] if `chunk_size == 0`, `num_threads == Some(0)`,
    /// or the thread pool cannot be built.
    pub fn new(opts: ExecutionOptions) -> FlattenResult<Self> {
        if opts.chunk_size == 0 {
            return Err(FlattenError::Configuration {
                message: "chunk_size must be > 0".to_string(),
            });
        }
        if opts.num_threads == Some(0) {
            return Err(FlattenError::Configuration {
                message: "num_threads must be > 0 when set".to_string(),
            });
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| FlattenError::Configuration {
                message: format!("failed to build thread pool: {e}"),
            })?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Project every record in `records`, in parallel chunks.
    ///
    /// `out[i]` is `project(&records[i], mapping)`.
    pub fn project_batch(&self, records: &[Record], mapping: &FieldMapping) -> Vec<Record> {
        self.pool.install(|| self.project_batch_impl(records, mapping))
    }

    fn project_batch_impl(&self, records: &[Record], mapping: &FieldMapping) -> Vec<Record> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            records: records.len(),
        });

        let per_chunk: Vec<Vec<Record>> = chunk_ranges(records.len(), self.opts.chunk_size)
            .into_par_iter()
            .map(|range| {
                self.metrics.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_record: range.start,
                    record_count: range.end - range.start,
                });

                let mut out = Vec::with_capacity(range.end - range.start);
                let mut changed_records = 0usize;
                for record in &records[range] {
                    let (projected, stats) = project_with_stats(record, mapping);
                    let changed = projected != *record;
                    if changed {
                        changed_records += 1;
                    }
                    self.metrics.on_record_projected(&stats, changed);
                    out.push(projected);
                }

                self.emit(ExecutionEvent::ChunkFinished { changed_records });
                self.metrics.on_chunk_end();
                out
            })
            .collect();

        let out = per_chunk.into_iter().flatten().collect::<Vec<_>>();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        out
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn chunk_ranges(len: usize, chunk_size: usize) -> Vec<std::ops::Range<usize>> {
    (0..len)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(len))
        .collect()
}
