//! Half-open byte intervals over a source buffer.

use std::cmp::{max, min};
use std::fmt;

/// A half-open byte interval `[begin, end)`.
///
/// Ranges are plain values: they never own or borrow the text they point at.
/// Bounds checking against a concrete buffer happens when a range is handed
/// to a [`Rewriter`](crate::Rewriter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Range {
    /// Starting byte offset (inclusive)
    pub begin: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl Range {
    /// Create a range from two offsets.
    ///
    /// `begin` must not exceed `end`; use [`Range::between`] when the order
    /// of the two offsets is not known.
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Create a range spanning two offsets in either order.
    pub fn between(a: usize, b: usize) -> Self {
        Self::new(min(a, b), max(a, b))
    }

    /// Zero-width range at `offset`.
    pub const fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Number of bytes covered.
    pub const fn size(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub const fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Zero-width range at the start of this one.
    pub const fn start_point(&self) -> Self {
        Self::point(self.begin)
    }

    /// Zero-width range at the end of this one.
    pub const fn end_point(&self) -> Self {
        Self::point(self.end)
    }

    /// True when both ranges share at least one byte.
    ///
    /// Zero-width ranges never overlap anything.
    pub const fn overlaps(&self, other: &Range) -> bool {
        other.end > self.begin && self.end > other.begin
    }

    /// True when the ranges share no byte.
    pub const fn disjoint(&self, other: &Range) -> bool {
        !self.overlaps(other)
    }

    /// True when `other` lies entirely inside this range.
    pub const fn contains(&self, other: &Range) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// The overlapping sub-range, or `None` when the ranges are disjoint.
    pub fn intersect(&self, other: &Range) -> Option<Range> {
        if self.begin >= other.end || other.begin >= self.end {
            return None;
        }
        Some(Range::new(
            max(self.begin, other.begin),
            min(self.end, other.end),
        ))
    }

    /// Smallest range covering both.
    pub fn join(&self, other: &Range) -> Range {
        Range::new(min(self.begin, other.begin), max(self.end, other.end))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}...{}", self.begin, self.end)
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Range::new(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.begin..r.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_and_empty() {
        assert_eq!(Range::new(2, 7).size(), 5);
        assert!(Range::point(3).is_empty());
        assert!(!Range::new(3, 4).is_empty());
    }

    #[test]
    fn test_between_orders_offsets() {
        assert_eq!(Range::between(9, 4), Range::new(4, 9));
        assert_eq!(Range::between(4, 9), Range::new(4, 9));
    }

    #[test]
    fn test_intersect() {
        let a = Range::new(0, 5);
        assert_eq!(a.intersect(&Range::new(3, 8)), Some(Range::new(3, 5)));
        assert_eq!(a.intersect(&Range::new(1, 2)), Some(Range::new(1, 2)));
        assert_eq!(a.intersect(&Range::new(5, 8)), None);
        assert_eq!(Range::new(5, 8).intersect(&a), None);
    }

    #[test]
    fn test_zero_width_never_overlaps() {
        let a = Range::new(0, 5);
        assert!(!a.overlaps(&Range::point(2)));
        assert!(!Range::point(2).overlaps(&Range::point(2)));
        assert!(a.disjoint(&Range::point(2)));
    }

    #[test]
    fn test_join_and_contains() {
        let joined = Range::new(2, 4).join(&Range::new(6, 9));
        assert_eq!(joined, Range::new(2, 9));
        assert!(joined.contains(&Range::new(4, 6)));
        assert!(!joined.contains(&Range::new(1, 3)));
    }
}
