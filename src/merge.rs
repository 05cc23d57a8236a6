//! Merging of overlapping actions that agree on the bytes they share.
//!
//! Two actions are compatible when the parts of their replacement texts that
//! line up with the shared byte range are identical. Compatible actions are
//! fused into one action covering their union.
//!
//! The fused replacement is a literal concatenation: replacement text is
//! assumed to align positionally with the range it replaces. When an action
//! grows or shrinks its range, the stitched offsets no longer point at
//! anything meaningful in either the source or the output, and the result is
//! only a best effort.

use crate::action::Action;
use std::cmp::max;

/// True when `new` agrees with every action in `existing` on their overlap.
pub fn can_merge(new: &Action, existing: &[&Action]) -> bool {
    existing.iter().all(|other| compatible(new, other))
}

/// Fuse `new` and `existing` into a single action covering their union.
///
/// Returns `None` when the stitched text would split a UTF-8 character.
/// Callers are expected to have checked [`can_merge`] first.
pub fn merge(new: &Action, existing: &[&Action]) -> Option<Action> {
    let mut actions: Vec<&Action> = existing.iter().copied().collect();
    actions.push(new);
    actions.sort_by_key(|a| (a.range().begin, a.range().end, a.order()));

    let range = actions
        .iter()
        .map(|a| a.range())
        .reduce(|acc, r| acc.join(&r))?;
    let order = actions.iter().map(|a| a.order()).min()?;

    let mut text = String::new();
    for action in &actions {
        let built_end = range.begin + text.len();
        let offset = built_end.saturating_sub(action.range().begin);
        let replacement = action.replacement();
        match replacement.get(offset..) {
            Some(rest) => text.push_str(rest),
            None if offset >= replacement.len() => {}
            None => return None,
        }
    }

    Some(Action::new(range, text, order))
}

fn compatible(a: &Action, b: &Action) -> bool {
    let Some(overlap) = a.range().intersect(&b.range()) else {
        return true;
    };
    let a_offset = overlap.begin - a.range().begin;
    let b_offset = overlap.begin - b.range().begin;

    // Each side is read for as long as the other side's range or text extends
    let a_len = extent(b, b_offset);
    let b_len = extent(a, a_offset);

    overlap_bytes(a.replacement(), a_offset, a_len) == overlap_bytes(b.replacement(), b_offset, b_len)
}

/// How far `action` reaches past `offset`, by range or by replacement text,
/// whichever is longer. `None` when both end before `offset`.
fn extent(action: &Action, offset: usize) -> Option<usize> {
    let by_range = action.range().size().checked_sub(offset);
    let by_text = action.replacement().len().checked_sub(offset);
    match (by_range, by_text) {
        (Some(r), Some(t)) => Some(max(r, t)),
        (r, t) => r.or(t),
    }
}

fn overlap_bytes(text: &str, offset: usize, len: Option<usize>) -> &[u8] {
    let bytes = text.as_bytes();
    let Some(len) = len else {
        return &[];
    };
    if offset > bytes.len() {
        return &[];
    }
    let end = offset.saturating_add(len).min(bytes.len());
    &bytes[offset..end]
}
