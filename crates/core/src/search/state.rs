//! Search states and their priority-queue ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::candidate::CandidateId;
use crate::interval::Interval;
use crate::search::params::ParameterBox;

/// A node of the search tree.
///
/// States are immutable once created. Children narrow `params` and may share
/// the parent's match list when bounding did not remove any candidate.
#[derive(Clone, Debug)]
pub struct SearchState<const K: usize> {
    params: ParameterBox<K>,
    matches: Arc<[CandidateId]>,
    quality: Interval,
    depth: u32,
    splits: u8,
    rank: u32,
    generation: u32,
}

impl<const K: usize> SearchState<K> {
    pub(crate) fn new(
        params: ParameterBox<K>,
        matches: Arc<[CandidateId]>,
        quality: Interval,
        depth: u32,
        splits: u8,
        rank: u32,
        generation: u32,
    ) -> Self {
        Self {
            params,
            matches,
            quality,
            depth,
            splits,
            rank,
            generation,
        }
    }

    pub fn params(&self) -> &ParameterBox<K> {
        &self.params
    }

    /// Candidates that may still be near the model somewhere in `params`.
    pub fn matches(&self) -> &[CandidateId] {
        &self.matches
    }

    pub(crate) fn shared_matches(&self) -> &Arc<[CandidateId]> {
        &self.matches
    }

    /// Bound on the quality reachable by any model inside `params`.
    pub fn quality(&self) -> Interval {
        self.quality
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of bisections on the path from the root.
    pub fn splits(&self) -> u8 {
        self.splits
    }

    /// Creation order within one search; unique per state.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }

    /// Point estimate of the model: midpoints of the parameter intervals.
    pub fn estimate(&self) -> [f64; K] {
        self.params.midpoint()
    }

    /// Queue key: (quality.hi, match count, earlier rank).
    ///
    /// The rank is unique, so the order is total and pops are reproducible.
    fn key_parts(&self) -> (OrderedFloat<f64>, usize, std::cmp::Reverse<u32>) {
        (
            OrderedFloat(self.quality.hi),
            self.matches.len(),
            std::cmp::Reverse(self.rank),
        )
    }
}

impl<const K: usize> PartialEq for SearchState<K> {
    fn eq(&self, other: &Self) -> bool {
        self.key_parts() == other.key_parts()
    }
}
impl<const K: usize> Eq for SearchState<K> {}

impl<const K: usize> PartialOrd for SearchState<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const K: usize> Ord for SearchState<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: the greatest key pops first
        self.key_parts().cmp(&other.key_parts())
    }
}
