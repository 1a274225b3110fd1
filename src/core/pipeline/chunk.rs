//! Chunking: bounded batches of records moving as a unit through the
//! pipeline, and the adaptive sizing policy that grows or shrinks them.

use crate::core::record::Record;

/// Lower bound on chunk size, regardless of adaptive sizing pressure.
pub const MIN_CHUNK_SIZE: usize = 500;
/// Upper bound on chunk size, regardless of adaptive sizing pressure.
pub const MAX_CHUNK_SIZE: usize = 10_000;
/// Default progress callback interval, in records.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000;

/// One bounded batch of decoded records, tagged with its position in the
/// input stream so worker-parallel results can be merged back in order.
#[derive(Debug)]
pub struct Chunk {
    /// 0-based position of this chunk within the file's chunk sequence.
    pub ordinal: u64,
    /// The records making up this chunk.
    pub records: Vec<Record>,
}

impl Chunk {
    /// Build a chunk from its ordinal and records.
    pub fn new(ordinal: u64, records: Vec<Record>) -> Self {
        Self { ordinal, records }
    }

    /// Number of records in this chunk.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this chunk holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parameters governing adaptive chunk sizing (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct ChunkSizePolicy {
    min: usize,
    max: usize,
    current: usize,
    /// Target per-record processing time in microseconds; chunks grow
    /// when the observed rate is comfortably under this and memory has
    /// headroom, and shrink otherwise.
    target_micros_per_record: f64,
}

impl Default for ChunkSizePolicy {
    fn default() -> Self {
        Self {
            min: MIN_CHUNK_SIZE,
            max: MAX_CHUNK_SIZE,
            current: MIN_CHUNK_SIZE,
            target_micros_per_record: 2.0,
        }
    }
}

impl ChunkSizePolicy {
    /// Build a policy with an explicit, fixed chunk size; adaptive growth
    /// and shrinkage are disabled (`adjust` is a no-op).
    pub fn fixed(size: usize) -> Self {
        Self {
            min: size,
            max: size,
            current: size,
            target_micros_per_record: 2.0,
        }
    }

    /// Current chunk size to use for the next batch.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Adjust chunk size after a completed chunk, given its observed
    /// per-record processing time and whether the memory guard currently
    /// has headroom. Clamped to `[min, max]`.
    pub fn adjust(&mut self, observed_micros_per_record: f64, memory_has_headroom: bool) {
        if self.min == self.max {
            return; // fixed-size policy
        }
        if observed_micros_per_record < self.target_micros_per_record && memory_has_headroom {
            self.current = (self.current + self.current / 2).min(self.max);
        } else if observed_micros_per_record > self.target_micros_per_record * 2.0
            || !memory_has_headroom
        {
            self.current = (self.current / 2).max(self.min);
        }
    }
}

/// Batches an incoming stream of records into chunks of the current
/// policy size, assigning sequential ordinals.
pub struct Batcher {
    policy: ChunkSizePolicy,
    buffer: Vec<Record>,
    next_ordinal: u64,
}

impl Batcher {
    /// Build a batcher starting from `policy`'s current chunk size.
    pub fn new(policy: ChunkSizePolicy) -> Self {
        Self {
            policy,
            buffer: Vec::with_capacity(policy.current()),
            next_ordinal: 0,
        }
    }

    /// Push one record into the in-flight batch. Returns a completed
    /// chunk if the batch just reached the current chunk size.
    pub fn push(&mut self, record: Record) -> Option<Chunk> {
        self.buffer.push(record);
        if self.buffer.len() >= self.policy.current() {
            Some(self.flush())
        } else {
            None
        }
    }

    /// Flush whatever is buffered (even if short of a full chunk) as the
    /// final chunk, e.g. at end of input.
    pub fn flush(&mut self) -> Chunk {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        Chunk::new(ordinal, std::mem::take(&mut self.buffer))
    }

    /// Whether the in-flight batch currently holds any records.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Mutable access to the chunk size policy, so the pipeline can call
    /// `adjust` between chunk dispatches.
    pub fn policy_mut(&mut self) -> &mut ChunkSizePolicy {
        &mut self.policy
    }
}
