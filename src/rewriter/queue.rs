use crate::action::Action;
use crate::merge::{can_merge, merge};
use crate::overlap::{overlapping, ClaimSet};

/// Scheduled actions plus the bytes they claim.
///
/// Cloned wholesale when a transaction opens; the clone is either promoted
/// or dropped when it closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Queue {
    actions: Vec<Action>,
    claims: ClaimSet,
}

/// How an action made it into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admitted {
    Appended,
    /// Fused with this many queued actions
    Merged(usize),
}

/// An action refused because it disagrees with a queued one.
#[derive(Debug)]
pub(crate) struct Clobbered {
    pub action: Action,
    pub colliding: Action,
}

impl Queue {
    pub(crate) fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Schedule `action`, merging it with the queued actions it overlaps
    /// when they agree on the shared bytes.
    ///
    /// On failure the queue is left untouched.
    pub(crate) fn admit(&mut self, action: Action) -> Result<Admitted, Clobbered> {
        let hits = overlapping(&self.claims, &self.actions, action.range());
        if hits.is_empty() {
            self.claims.claim(action.range());
            self.actions.push(action);
            return Ok(Admitted::Appended);
        }

        let existing: Vec<&Action> = hits.iter().map(|&idx| &self.actions[idx]).collect();
        let merged = if can_merge(&action, &existing) {
            merge(&action, &existing)
        } else {
            None
        };

        let Some(merged) = merged else {
            // Report the first queued action that actually disagrees
            let colliding = existing
                .iter()
                .find(|other| !can_merge(&action, &[**other]))
                .unwrap_or(&existing[0]);
            return Err(Clobbered {
                colliding: (*colliding).clone(),
                action,
            });
        };

        // `hits` is ascending, so removing back to front keeps indices valid
        for &idx in hits.iter().rev() {
            self.actions.remove(idx);
        }
        self.claims.claim(merged.range());
        self.actions.push(merged);
        Ok(Admitted::Merged(hits.len()))
    }
}
