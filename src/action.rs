use crate::range::Range;
use std::fmt;

/// One scheduled edit: replace the bytes in `range` with `replacement`.
///
/// Actions are immutable. Merging overlapping actions builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    range: Range,
    replacement: String,
    /// Submission order, used as the tie-break between actions that start
    /// at the same offset
    order: usize,
}

impl Action {
    pub fn new(range: Range, replacement: impl Into<String>, order: usize) -> Self {
        Self {
            range,
            replacement: replacement.into(),
            order,
        }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Pure insertion: a zero-width range.
    pub fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }

    /// Change in buffer length once this action is applied.
    pub fn delta(&self) -> isize {
        self.replacement.len() as isize - self.range.size() as isize
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.range.size();
        match (size, self.replacement.is_empty()) {
            (0, true) => write!(f, "do nothing"),
            (0, false) => write!(f, "insert {:?}", self.replacement),
            (_, true) => write!(f, "remove {size} character(s)"),
            (_, false) => write!(
                f,
                "replace {size} character(s) with {:?}",
                self.replacement
            ),
        }
    }
}
