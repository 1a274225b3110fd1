//! Execution mode selection (§5 of the concurrency/resource model).
//!
//! Three modes share identical classification semantics; they differ only
//! in how records flow between ingestion and classification. Selection is
//! an explicit, testable function rather than inline branching in `main`,
//! so mode equivalence (P2) can be exercised directly against a fixture.

/// Soft threshold (in records) below which in-memory mode is used when the
/// caller has not forced a different mode.
pub const IN_MEMORY_RECORD_THRESHOLD: u64 = 50_000;

/// One of the three streaming execution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Single-threaded, whole file loaded into memory.
    InMemory,
    /// Single-threaded cooperative chunk pipeline; never materialises the
    /// full record set.
    BoundedStreaming,
    /// Ingestion thread + N classifier workers + one collector thread.
    WorkerParallel(usize),
}

/// CLI flags that influence mode selection, kept separate from the full
/// argument struct so selection can be unit tested without constructing a
/// `clap` parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeFlags {
    /// `--stream`: force bounded-memory streaming mode.
    pub force_stream: bool,
    /// `--distributed` / `--workers N`: force worker-parallel mode with
    /// the given worker count.
    pub workers: Option<usize>,
}

/// Choose an execution mode for a file of `record_count_hint` records (when
/// known ahead of time, e.g. from a prior line count; `None` if unknown).
///
/// An explicit `--workers` / `--distributed` flag always wins. Otherwise
/// `--stream` forces bounded-streaming. Otherwise the record-count hint
/// decides: below [`IN_MEMORY_RECORD_THRESHOLD`] records, in-memory;
/// above it, bounded-streaming. An unknown hint is treated conservatively
/// as "large" (bounded-streaming), since overestimating memory discipline
/// is always safe.
pub fn select_mode(record_count_hint: Option<u64>, flags: ModeFlags) -> ExecutionMode {
    if let Some(workers) = flags.workers {
        return ExecutionMode::WorkerParallel(workers.max(1));
    }
    if flags.force_stream {
        return ExecutionMode::BoundedStreaming;
    }
    match record_count_hint {
        Some(count) if count <= IN_MEMORY_RECORD_THRESHOLD => ExecutionMode::InMemory,
        _ => ExecutionMode::BoundedStreaming,
    }
}

/// Default worker count when `--distributed` is given without an explicit
/// `--workers N`: `max(cores - 1, 1)`.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}
