//! The Top-K aggregator: a bounded min-heap that retains only the K
//! highest-scored classification results seen so far, independent of how
//! many records the input file actually contains.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::classifier::ClassificationResult;

/// Default K used when the caller does not override it.
pub const DEFAULT_K: usize = 100;

/// Wrapper that orders `ClassificationResult`s by score for heap purposes.
/// Ties are broken by insertion order (earlier insertions considered
/// "smaller", so later ties survive a pop) to keep `top()` stable across
/// runs with identical score distributions.
struct Entry {
    score: i64,
    sequence: u64,
    result: ClassificationResult,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.sequence == other.sequence
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// A bounded aggregator retaining the `k` highest-scored results inserted
/// into it. Backed by a min-heap so eviction of the current minimum is
/// `O(log k)` and memory is bounded by `k` regardless of stream length.
pub struct TopKAggregator {
    k: usize,
    heap: BinaryHeap<std::cmp::Reverse<Entry>>,
    next_sequence: u64,
}

impl TopKAggregator {
    /// Create an aggregator retaining at most `k` results.
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            heap: BinaryHeap::with_capacity(k.max(1)),
            next_sequence: 0,
        }
    }

    /// Offer a classification result. Retained if the heap has not yet
    /// reached capacity, or if its score beats the current minimum.
    ///
    /// Returns whichever [`ClassificationResult`] did *not* end up retained
    /// (the offered one if it was rejected outright, or the evicted prior
    /// minimum if it replaced one) so the caller can release its estimated
    /// memory footprint — records not retained by Top-K become garbage
    /// immediately, per the streaming memory-bound invariant.
    pub fn offer(&mut self, result: ClassificationResult) -> Option<ClassificationResult> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let entry = Entry {
            score: result.score,
            sequence,
            result,
        };

        if self.heap.len() < self.k {
            self.heap.push(std::cmp::Reverse(entry));
            return None;
        }

        let should_replace = matches!(
            self.heap.peek(),
            Some(std::cmp::Reverse(min)) if entry.score > min.score
        );
        if should_replace {
            let std::cmp::Reverse(evicted) = self.heap.pop().expect("heap at capacity is non-empty");
            self.heap.push(std::cmp::Reverse(entry));
            Some(evicted.result)
        } else {
            Some(entry.result)
        }
    }

    /// Current number of retained results.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the aggregator holds no results.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The `n` highest-scored retained results, in descending score order.
    /// Ties are broken by insertion order (earlier results first).
    pub fn top(&self, n: usize) -> Vec<&ClassificationResult> {
        let mut entries: Vec<&Entry> = self.heap.iter().map(|rev| &rev.0).collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.sequence.cmp(&b.sequence)));
        entries.into_iter().take(n).map(|e| &e.result).collect()
    }

    /// Consume the aggregator, returning all retained results in
    /// descending score order.
    pub fn into_sorted_vec(self) -> Vec<ClassificationResult> {
        let mut entries: Vec<Entry> = self.heap.into_iter().map(|rev| rev.0).collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.sequence.cmp(&b.sequence)));
        entries.into_iter().map(|e| e.result).collect()
    }
}


#[cfg(test)]
mod quickcheck_properties {
    use super::*;
    use crate::core::catalog::RiskLevel;
    use crate::core::record::{Record, RecordType, DEFAULT_TTL};
    use quickcheck_macros::quickcheck;

    fn result(sequence: usize, score: i64) -> ClassificationResult {
        ClassificationResult {
            record: Record {
                name: format!("r{sequence}.example.com"),
                type_: RecordType::A,
                content: "192.0.2.1".to_string(),
                ttl: DEFAULT_TTL,
                proxied: None,
                created: None,
                modified: None,
                provider: None,
            },
            score,
            level: RiskLevel::Low,
            matched_patterns: vec![],
            reasons: vec![],
        }
    }

    /// The aggregator never retains more than `k` entries, and `top(n)`
    /// never hands back more than it actually holds, no matter what
    /// sequence of scores is offered.
    #[quickcheck]
    fn never_exceeds_k(k: usize, scores: Vec<i64>) -> bool {
        let k = k % 50 + 1; // keep the heap small for a fast property check
        let mut agg = TopKAggregator::new(k);
        for (i, score) in scores.iter().enumerate() {
            agg.offer(result(i, *score));
        }
        agg.len() <= k && agg.top(k + 5).len() == agg.len()
    }

    /// The retained minimum is always at least as large as the lowest
    /// score actually offered once the heap has filled to capacity.
    #[quickcheck]
    fn retains_highest_scores(scores: Vec<i64>) -> bool {
        if scores.len() < 3 {
            return true;
        }
        let k = 3;
        let mut agg = TopKAggregator::new(k);
        for (i, score) in scores.iter().enumerate() {
            agg.offer(result(i, *score));
        }
        let mut sorted_scores = scores.clone();
        sorted_scores.sort_unstable_by(|a, b| b.cmp(a));
        let expected_min = sorted_scores[k.min(sorted_scores.len()) - 1];
        agg.top(k).iter().all(|r| r.score >= expected_min)
    }
}
