//! Overlap tracking for queued actions.
//!
//! Claimed bytes are kept as a sorted list of disjoint, non-adjacent ranges,
//! so "is anything here claimed?" is a binary search. Only when that answers
//! yes is the queue itself scanned for the actions that collide.
//!
//! Zero-width ranges never claim anything and never collide with anything.

use crate::action::Action;
use crate::range::Range;

/// Sorted, coalesced set of claimed byte ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    claims: Vec<Range>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every byte of `range` as occupied. No-op for zero-width ranges.
    pub fn claim(&mut self, range: Range) {
        if range.is_empty() {
            return;
        }

        // Claims that overlap or touch `range` form one contiguous run
        let lo = self.claims.partition_point(|c| c.end < range.begin);
        let hi = self.claims.partition_point(|c| c.begin <= range.end);

        let merged = self.claims[lo..hi]
            .iter()
            .fold(range, |acc, claim| acc.join(claim));
        self.claims.splice(lo..hi, std::iter::once(merged));
    }

    /// True when at least one byte of `range` is claimed.
    pub fn is_claimed(&self, range: Range) -> bool {
        if range.is_empty() {
            return false;
        }
        let idx = self.claims.partition_point(|c| c.end <= range.begin);
        self.claims
            .get(idx)
            .is_some_and(|claim| claim.begin < range.end)
    }

    pub fn ranges(&self) -> &[Range] {
        &self.claims
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Indices of every non-zero-width action in `queue` that shares a byte
/// with `range`.
pub fn overlapping(claims: &ClaimSet, queue: &[Action], range: Range) -> Vec<usize> {
    if !claims.is_claimed(range) {
        return Vec::new();
    }
    queue
        .iter()
        .enumerate()
        .filter(|(_, action)| !action.is_insertion() && action.range().overlaps(&range))
        .map(|(idx, _)| idx)
        .collect()
}
