//! Chunk Pipeline (C7): the central streaming engine.
//!
//! States `Idle -> Reading -> Draining -> Done | Failed` mirror a run's
//! lifecycle explicitly, rather than being implicit in control flow.
//! Ingestion reads rows from the CSV Source, decodes them through the
//! detected provider adapter, batches them into chunks, and dispatches
//! each chunk to the processing stage (in-process or worker-pool)
//! according to the selected [`ExecutionMode`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::core::catalog::PatternCatalog;
use crate::core::classifier::classify;
use crate::core::errors::Result;
use crate::core::pipeline::chunk::{Batcher, ChunkSizePolicy, DEFAULT_PROGRESS_INTERVAL};
use crate::core::pipeline::memory_guard::{estimate_result_bytes, MemoryGuard, DEFAULT_SOFT_CAP_MIB};
use crate::core::pipeline::mode::ExecutionMode;
use crate::core::pipeline::summary::AnalysisSummary;
use crate::core::record::Record;
use crate::core::topk::TopKAggregator;
use crate::io::csv_source::CsvSource;
use crate::providers::{DecodeOutcome, HeaderIndex, ProviderAdapter};
use tracing::{debug, info, warn};

/// Lifecycle state of one pipeline run, mirrored for diagnostics and
/// progress reporting (`--verbose` surfaces state transitions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Constructed, not yet started.
    Idle,
    /// Actively reading and batching rows.
    Reading,
    /// Final chunks dispatched; waiting for in-flight work to complete.
    Draining,
    /// Completed successfully.
    Done,
    /// Aborted by a structural error.
    Failed,
}

/// A snapshot delivered to the progress callback every
/// `progress_interval` records.
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate {
    /// Records classified so far.
    pub records_processed: u64,
    /// Bytes read from the source so far (approximated by row count when
    /// exact byte offsets are unavailable).
    pub bytes_processed: u64,
    /// Records per second since the run started.
    pub current_throughput: f64,
    /// Estimated resident bytes currently retained, in MiB.
    pub memory_usage_mib: u64,
}

/// Configuration for one pipeline run, independent of the execution mode.
pub struct PipelineConfig {
    /// Soft memory cap, in MiB.
    pub memory_limit_mib: u64,
    /// Fixed chunk size; `None` enables adaptive sizing.
    pub fixed_chunk_size: Option<usize>,
    /// How many records between progress callback invocations.
    pub progress_interval: u64,
    /// Bound on the top-K aggregator.
    pub top_k: usize,
    /// `--provider` override; `None` runs detection.
    pub provider_override: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            memory_limit_mib: DEFAULT_SOFT_CAP_MIB,
            fixed_chunk_size: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            top_k: crate::core::topk::DEFAULT_K,
            provider_override: None,
        }
    }
}

/// A cooperative cancellation flag, checked at every suspension point
/// (batch read, chunk dispatch, output write).
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Build a fresh, unset token.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run one file through the chunk pipeline end to end.
///
/// `progress` is invoked at most every `config.progress_interval` records;
/// it may be a no-op closure when `--quiet` is set. Returns the run's
/// [`AnalysisSummary`], tagged `interrupted` if `cancellation` fired
/// before the source was exhausted.
pub fn run_pipeline(
    source: &mut CsvSource,
    source_name: &str,
    zone_hint: &str,
    registry: &crate::providers::ProviderRegistry,
    catalog: Arc<PatternCatalog>,
    mode: ExecutionMode,
    config: &PipelineConfig,
    cancellation: &CancellationToken,
    mut progress: impl FnMut(ProgressUpdate),
    mut on_result: impl FnMut(&crate::core::classifier::ClassificationResult),
) -> Result<AnalysisSummary> {
    let header = HeaderIndex::new(source.header().to_vec());
    let (provider_id, ambiguous) = match &config.provider_override {
        Some(id) => (id.clone(), false),
        None => {
            let detection = registry.detect(&header);
            (detection.provider_id.to_string(), detection.ambiguous)
        }
    };
    let adapter = registry.get(&provider_id);
    if ambiguous {
        warn!(file = source_name, "provider detection ambiguous, falling back to generic adapter");
    } else {
        info!(file = source_name, provider = %provider_id, "provider detected");
    }

    let mut summary = AnalysisSummary::new(source_name.to_string(), provider_id.clone());
    if ambiguous {
        summary.add_warning(1, "no adapter exceeded the detection confidence threshold; using generic adapter");
    }

    let mut memory_guard = MemoryGuard::new(config.memory_limit_mib);
    let mut top_k = TopKAggregator::new(config.top_k);
    let policy = match config.fixed_chunk_size {
        Some(size) => ChunkSizePolicy::fixed(size),
        None => ChunkSizePolicy::default(),
    };
    let mut batcher = Batcher::new(policy);

    // One worker pool lives for the whole file rather than being respawned
    // per chunk, so the thread pool amortises across every chunk dispatched
    // during this run instead of paying spawn/join cost per batch.
    let worker_pool = match mode {
        ExecutionMode::WorkerParallel(workers) => {
            Some(crate::core::pipeline::workers::WorkerPool::spawn(workers, Arc::clone(&catalog)))
        }
        ExecutionMode::InMemory | ExecutionMode::BoundedStreaming => None,
    };

    let start = Instant::now();
    let mut records_since_progress: u64 = 0;
    let mut status = PipelineStatus::Reading;

    'ingest: loop {
        if cancellation.is_cancelled() {
            summary.mark_interrupted();
            info!(file = source_name, records = summary.total_records, "cancellation observed, draining");
            break 'ingest;
        }

        let Some(row) = source.next_row() else {
            for warning in source.take_warnings() {
                summary.add_warning(0, warning);
            }
            break 'ingest;
        };
        for warning in source.take_warnings() {
            summary.add_warning(row.line, warning);
        }

        let decoded = decode_row(adapter, &row.fields, &header, zone_hint);
        let record = match decoded {
            DecodeOutcome::Ok(record) => *record,
            DecodeOutcome::Skip(reason) => {
                summary.add_warning(row.line, reason);
                continue;
            }
        };

        if let Some(chunk) = batcher.push(record) {
            let chunk_started = Instant::now();
            let chunk_len = chunk.len().max(1) as f64;
            debug!(ordinal = chunk.ordinal, size = chunk.len(), "chunk dispatched");
            process_chunk(
                chunk,
                &catalog,
                worker_pool.as_ref(),
                &mut summary,
                &mut top_k,
                &mut memory_guard,
                &mut on_result,
            )?;
            let micros_per_record = chunk_started.elapsed().as_micros() as f64 / chunk_len;
            batcher
                .policy_mut()
                .adjust(micros_per_record, memory_guard.has_headroom());
            if memory_guard.over_soft_cap() {
                warn!(mib = memory_guard.resident_mib(), "memory guard tripped, shrinking chunk size");
            }
        }

        records_since_progress += 1;
        if records_since_progress >= config.progress_interval {
            progress(ProgressUpdate {
                records_processed: summary.total_records,
                bytes_processed: summary.total_records,
                current_throughput: summary.total_records as f64 / start.elapsed().as_secs_f64().max(1e-6),
                memory_usage_mib: memory_guard.resident_mib(),
            });
            records_since_progress = 0;
        }
    }

    status = PipelineStatus::Draining;
    debug!(file = source_name, ?status, "draining in-flight batch");
    if batcher.has_pending() {
        let chunk = batcher.flush();
        process_chunk(
            chunk,
            &catalog,
            worker_pool.as_ref(),
            &mut summary,
            &mut top_k,
            &mut memory_guard,
            &mut on_result,
        )?;
    }

    if let Some(pool) = worker_pool {
        pool.shutdown();
    }

    summary.finish(start.elapsed().as_secs_f64(), top_k);
    info!(file = source_name, records = summary.total_records, "analysis complete");
    Ok(summary)
}

fn decode_row<'a>(
    adapter: &dyn ProviderAdapter,
    fields: &'a [String],
    header: &HeaderIndex,
    zone_hint: &str,
) -> DecodeOutcome {
    adapter.decode_row(fields, header, zone_hint)
}

fn process_chunk(
    chunk: crate::core::pipeline::chunk::Chunk,
    catalog: &Arc<PatternCatalog>,
    worker_pool: Option<&crate::core::pipeline::workers::WorkerPool>,
    summary: &mut AnalysisSummary,
    top_k: &mut TopKAggregator,
    memory_guard: &mut MemoryGuard,
    on_result: &mut impl FnMut(&crate::core::classifier::ClassificationResult),
) -> Result<()> {
    let results = match worker_pool {
        Some(pool) => crate::core::pipeline::workers::run_chunk_on_pool(pool, chunk)?,
        None => classify_chunk_in_process(&chunk.records, catalog),
    };

    for result in results {
        on_result(&result);
        memory_guard.add(estimate_result_bytes(&result));
        summary.record(result.level);
        if let Some(dropped) = top_k.offer(result) {
            memory_guard.release(estimate_result_bytes(&dropped));
        }
    }
    memory_guard.check_after_chunk()
}

fn classify_chunk_in_process(
    records: &[Record],
    catalog: &PatternCatalog,
) -> Vec<crate::core::classifier::ClassificationResult> {
    records.iter().map(|record| classify(record, catalog)).collect()
}
