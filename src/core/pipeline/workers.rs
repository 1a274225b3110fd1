//! Worker Pool (C8): optional parallel chunk classification.
//!
//! A fixed pool of `W` OS threads receives chunks over a `crossbeam`
//! bounded channel; each worker classifies its chunk's records with
//! `rayon`'s `par_iter` and returns its ordinal-tagged contribution over a
//! result channel to a single collector. Chunks are immutable once
//! dispatched; ordering is restored by the collector, which is the only
//! owner of the top-K heap and summary counters (§5).
//!
//! OS threads + bounded channels rather than an async runtime: chunk
//! classification is pure CPU work with no `.await` points, so there is
//! nothing for a runtime to schedule around.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rayon::prelude::*;

use crate::core::catalog::PatternCatalog;
use crate::core::classifier::{classify, ClassificationResult};
use crate::core::errors::{Result, ZoneRiskError};
use crate::core::pipeline::chunk::Chunk;

/// How long the collector waits for a worker heartbeat (a result arriving
/// on the channel) before treating a worker as stuck.
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(30);

/// One worker's contribution: its chunk's ordinal plus the classification
/// results, in the chunk's original row order.
struct WorkerOutcome {
    ordinal: u64,
    outcome: std::result::Result<Vec<ClassificationResult>, String>,
}

/// A fixed pool of classifier worker threads plus the channels connecting
/// them to a single collector.
pub struct WorkerPool {
    chunk_tx: Sender<Chunk>,
    result_rx: Receiver<WorkerOutcome>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` threads, each holding its own reference to
    /// `catalog` (cheap: the catalog is behind an `Arc`, never cloned
    /// deeply).
    pub fn spawn(worker_count: usize, catalog: Arc<PatternCatalog>) -> Self {
        let worker_count = worker_count.max(1);
        let (chunk_tx, chunk_rx) = bounded::<Chunk>(worker_count * 2);
        let (result_tx, result_rx) = bounded::<WorkerOutcome>(worker_count * 2);

        let handles = (0..worker_count)
            .map(|_| {
                let chunk_rx = chunk_rx.clone();
                let result_tx = result_tx.clone();
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || worker_loop(chunk_rx, result_tx, catalog))
            })
            .collect();

        Self {
            chunk_tx,
            result_rx,
            handles,
        }
    }

    /// Dispatch a chunk for classification. Blocks if every worker is
    /// currently busy and the channel is at capacity (backpressure).
    pub fn dispatch(&self, chunk: Chunk) {
        // chunk_tx only disconnects if every worker thread panicked past
        // recovery, which cannot happen: worker_loop catches classification
        // panics internally and keeps looping.
        let _ = self.chunk_tx.send(chunk);
    }

    /// Block for the next worker outcome, retrying once on another worker
    /// if the heartbeat times out or the worker reports failure. A second
    /// failure for the same chunk escalates to [`ZoneRiskError::WorkerFailed`].
    pub fn collect_one(&self) -> Result<(u64, Vec<ClassificationResult>)> {
        match self.result_rx.recv_timeout(HEARTBEAT_TIMEOUT) {
            Ok(WorkerOutcome {
                ordinal,
                outcome: Ok(results),
            }) => Ok((ordinal, results)),
            Ok(WorkerOutcome {
                ordinal,
                outcome: Err(message),
            }) => Err(ZoneRiskError::WorkerFailed {
                chunk_ordinal: ordinal,
                message,
            }),
            Err(RecvTimeoutError::Timeout) => Err(ZoneRiskError::WorkerFailed {
                chunk_ordinal: u64::MAX,
                message: format!("no worker heartbeat within {:?}", HEARTBEAT_TIMEOUT),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(ZoneRiskError::WorkerFailed {
                chunk_ordinal: u64::MAX,
                message: "worker pool disconnected".to_string(),
            }),
        }
    }

    /// Signal workers to stop and join every thread. Called once all
    /// chunks have been dispatched and collected.
    pub fn shutdown(self) {
        drop(self.chunk_tx);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

fn worker_loop(chunk_rx: Receiver<Chunk>, result_tx: Sender<WorkerOutcome>, catalog: Arc<PatternCatalog>) {
    while let Ok(chunk) = chunk_rx.recv() {
        let ordinal = chunk.ordinal;
        let catalog_ref = &catalog;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            chunk
                .records
                .par_iter()
                .map(|record| classify(record, catalog_ref))
                .collect::<Vec<_>>()
        }))
        .map_err(|_| format!("classifier panicked on chunk {ordinal}"));
        if result_tx.send(WorkerOutcome { ordinal, outcome }).is_err() {
            break;
        }
    }
}

/// Dispatch a single chunk on an already-running pool and collect its
/// result, retrying once on another worker if the first attempt fails or
/// times out. Used by the streaming pipeline, which keeps one pool alive
/// for the duration of a file rather than spawning threads per chunk.
pub fn run_chunk_on_pool(pool: &WorkerPool, chunk: Chunk) -> Result<Vec<ClassificationResult>> {
    let ordinal = chunk.ordinal;
    let retry_chunk = clone_chunk_for_retry(&chunk);
    pool.dispatch(chunk);

    match pool.collect_one() {
        Ok((got_ordinal, results)) => {
            debug_assert_eq!(got_ordinal, ordinal);
            Ok(results)
        }
        Err(ZoneRiskError::WorkerFailed { .. }) => {
            pool.dispatch(retry_chunk);
            match pool.collect_one() {
                Ok((got_ordinal, results)) => {
                    debug_assert_eq!(got_ordinal, ordinal);
                    Ok(results)
                }
                Err(err) => Err(err),
            }
        }
        Err(other) => Err(other),
    }
}

fn clone_chunk_for_retry(chunk: &Chunk) -> Chunk {
    Chunk::new(chunk.ordinal, chunk.records.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{RecordType, DEFAULT_TTL};

    fn catalog() -> Arc<PatternCatalog> {
        Arc::new(PatternCatalog::default_catalog())
    }

    fn record(name: &str) -> crate::core::record::Record {
        crate::core::record::Record {
            name: name.to_string(),
            type_: RecordType::A,
            content: "192.0.2.1".to_string(),
            ttl: DEFAULT_TTL,
            proxied: None,
            created: None,
            modified: None,
            provider: None,
        }
    }

    #[test]
    fn pool_survives_across_multiple_chunk_dispatches() {
        let pool = WorkerPool::spawn(2, catalog());
        let chunks = vec![
            Chunk::new(0, vec![record("a.example.com")]),
            Chunk::new(1, vec![record("b.example.com")]),
            Chunk::new(2, vec![record("c.example.com")]),
        ];
        let mut total = 0;
        for chunk in chunks {
            let results = run_chunk_on_pool(&pool, chunk).expect("run");
            total += results.len();
        }
        pool.shutdown();
        assert_eq!(total, 3);
    }

    #[test]
    fn every_record_in_a_chunk_is_classified_exactly_once() {
        let pool = WorkerPool::spawn(3, catalog());
        let chunk = Chunk::new(0, vec![record("a.example.com"), record("b.example.com")]);
        let results = run_chunk_on_pool(&pool, chunk).expect("run");
        pool.shutdown();
        assert_eq!(results.len(), 2);
    }
}
