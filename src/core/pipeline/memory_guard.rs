//! The memory guard: a soft cap on the pipeline's own retained state.
//!
//! Estimates resident bytes from the records and classification results
//! the pipeline is currently holding, rather than querying the OS for
//! process RSS — the invariant this guards (P3) is about the pipeline's
//! own retained state, not total process memory, which is affected by
//! allocator behaviour the pipeline does not control.

use crate::core::classifier::ClassificationResult;
use crate::core::errors::{Result, ZoneRiskError};
use crate::core::record::Record;

/// Soft memory cap, in MiB, applied when the caller does not override it.
pub const DEFAULT_SOFT_CAP_MIB: u64 = 100;
/// The soft cap can be configured down to this floor, but no lower.
pub const MIN_SOFT_CAP_MIB: u64 = 50;

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Estimate the heap footprint of a single record: its fixed struct size
/// plus the heap allocations behind its `String` fields.
pub fn estimate_record_bytes(record: &Record) -> u64 {
    let base = std::mem::size_of::<Record>() as u64;
    let heap = record.name.len()
        + record.content.len()
        + record.created.as_ref().map_or(0, String::len)
        + record.modified.as_ref().map_or(0, String::len)
        + record.provider.as_ref().map_or(0, String::len);
    base + heap as u64
}

/// Estimate the heap footprint of a classification result: the record
/// plus its matched-pattern and reason strings.
pub fn estimate_result_bytes(result: &ClassificationResult) -> u64 {
    let base = estimate_record_bytes(&result.record) + std::mem::size_of::<ClassificationResult>() as u64;
    let strings: usize = result.matched_patterns.iter().map(String::len).sum::<usize>()
        + result.reasons.iter().map(String::len).sum::<usize>();
    base + strings as u64
}

/// Tracks the pipeline's estimated resident bytes and trips
/// [`ZoneRiskError::MemoryExceeded`] when the cap is exceeded by more
/// than 2x for a full chunk.
pub struct MemoryGuard {
    soft_cap_bytes: u64,
    resident_bytes: u64,
    consecutive_overshoots: u32,
}

impl MemoryGuard {
    /// Build a guard with `soft_cap_mib`, clamped to the configurable
    /// floor of [`MIN_SOFT_CAP_MIB`].
    pub fn new(soft_cap_mib: u64) -> Self {
        Self {
            soft_cap_bytes: soft_cap_mib.max(MIN_SOFT_CAP_MIB) * BYTES_PER_MIB,
            resident_bytes: 0,
            consecutive_overshoots: 0,
        }
    }

    /// Current resident-byte estimate, in MiB.
    pub fn resident_mib(&self) -> u64 {
        self.resident_bytes / BYTES_PER_MIB
    }

    /// Record that `bytes` of new state are now being retained (e.g. a
    /// freshly classified chunk added to the top-K aggregator).
    pub fn add(&mut self, bytes: u64) {
        self.resident_bytes += bytes;
    }

    /// Record that `bytes` of previously retained state were released
    /// (e.g. a chunk's non-retained records were dropped after scoring).
    pub fn release(&mut self, bytes: u64) {
        self.resident_bytes = self.resident_bytes.saturating_sub(bytes);
    }

    /// Whether the guard currently has headroom under the soft cap,
    /// consulted by adaptive chunk sizing.
    pub fn has_headroom(&self) -> bool {
        self.resident_bytes < self.soft_cap_bytes
    }

    /// Whether the soft cap is currently exceeded (but not yet by the 2x
    /// margin that would be fatal).
    pub fn over_soft_cap(&self) -> bool {
        self.resident_bytes > self.soft_cap_bytes
    }

    /// Called once per completed chunk. Tracks consecutive overshoots
    /// beyond 2x the soft cap and returns `MemoryExceeded` once that has
    /// persisted for a full chunk.
    pub fn check_after_chunk(&mut self) -> Result<()> {
        if self.resident_bytes > self.soft_cap_bytes * 2 {
            self.consecutive_overshoots += 1;
            if self.consecutive_overshoots >= 2 {
                return Err(ZoneRiskError::MemoryExceeded {
                    current_mb: self.resident_mib(),
                    limit_mb: self.soft_cap_bytes / BYTES_PER_MIB,
                });
            }
        } else {
            self.consecutive_overshoots = 0;
        }
        Ok(())
    }
}
