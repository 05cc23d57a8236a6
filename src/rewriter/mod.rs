//! The edit scheduler.
//!
//! A [`Rewriter`] collects edits against an immutable [`SourceBuffer`],
//! refuses edits that clobber each other, and produces the rewritten text in
//! a single pass. Submission order only matters for edits sharing a start
//! offset (see [`Rewriter::process`]).
//!
//! # State machine
//!
//! The rewriter is either *live* or *in a transaction*. While a transaction
//! is open every edit goes to a snapshot of the live queue; the snapshot
//! replaces the live queue only if the transaction body returns `Ok`.
//! Transactions do not nest, and [`Rewriter::process`] refuses to run inside
//! one.
//!
//! # Example
//!
//! ```
//! use span_rewriter::{Range, Rewriter, SourceBuffer};
//!
//! let buffer = SourceBuffer::new("example.rs", "let foo = 1;");
//! let mut rewriter = Rewriter::new(&buffer);
//! rewriter
//!     .replace(Range::new(4, 7), "bar")?
//!     .insert_after(Range::new(0, 12), " // renamed")?;
//!
//! assert_eq!(rewriter.process()?, "let bar = 1; // renamed");
//! # Ok::<(), span_rewriter::RewriteError>(())
//! ```

mod errors;
mod queue;

pub use errors::{ConflictError, RewriteError, StateError};

use crate::action::Action;
use crate::buffer::SourceBuffer;
use crate::diagnostic::{Diagnostic, DiagnosticSink, StderrSink};
use crate::range::Range;
use log::{debug, trace};
use queue::{Admitted, Queue};

#[derive(Debug)]
pub struct Rewriter<'s, D: DiagnosticSink = StderrSink> {
    buffer: &'s SourceBuffer,
    live: Queue,
    /// Snapshot edited by an open transaction
    pending: Option<Queue>,
    next_order: usize,
    diagnostics: D,
}

impl<'s> Rewriter<'s, StderrSink> {
    /// Create a rewriter that prints diagnostics to stderr.
    pub fn new(buffer: &'s SourceBuffer) -> Self {
        Self::with_sink(buffer, StderrSink)
    }
}

impl<'s, D: DiagnosticSink> Rewriter<'s, D> {
    pub fn with_sink(buffer: &'s SourceBuffer, diagnostics: D) -> Self {
        Self {
            buffer,
            live: Queue::default(),
            pending: None,
            next_order: 0,
            diagnostics,
        }
    }

    pub fn buffer(&self) -> &'s SourceBuffer {
        self.buffer
    }

    pub fn source(&self) -> &'s str {
        self.buffer.source()
    }

    pub fn is_in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> D {
        self.diagnostics
    }

    /// Committed actions in the order [`process`](Self::process) applies
    /// them.
    pub fn actions(&self) -> Vec<&Action> {
        apply_order(self.live.actions())
    }

    /// Delete the bytes in `range`.
    pub fn remove(&mut self, range: Range) -> Result<&mut Self, RewriteError> {
        self.schedule(range, String::new())
    }

    /// Insert `text` immediately before `range`.
    pub fn insert_before(
        &mut self,
        range: Range,
        text: impl Into<String>,
    ) -> Result<&mut Self, RewriteError> {
        self.schedule(range.start_point(), text.into())
    }

    /// Insert `text` immediately after `range`.
    pub fn insert_after(
        &mut self,
        range: Range,
        text: impl Into<String>,
    ) -> Result<&mut Self, RewriteError> {
        self.schedule(range.end_point(), text.into())
    }

    /// Replace the bytes in `range` with `text`.
    pub fn replace(
        &mut self,
        range: Range,
        text: impl Into<String>,
    ) -> Result<&mut Self, RewriteError> {
        self.schedule(range, text.into())
    }

    /// Surround `range` with `before` and `after`.
    pub fn wrap(
        &mut self,
        range: Range,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Result<&mut Self, RewriteError> {
        self.insert_before(range, before)?;
        self.insert_after(range, after)
    }

    /// Run `body` as an all-or-nothing batch.
    ///
    /// Edits made by `body` are kept only if it returns `Ok`. Any error,
    /// whether a clobbering edit or one raised by the caller, discards every
    /// edit of the batch and is returned unchanged. A panic inside `body`
    /// discards the batch as well.
    pub fn transaction<F, E>(&mut self, body: F) -> Result<&mut Self, E>
    where
        F: FnOnce(&mut Self) -> Result<(), E>,
        E: From<RewriteError>,
    {
        if self.pending.is_some() {
            return Err(RewriteError::from(StateError::NestedTransaction).into());
        }

        self.pending = Some(self.live.clone());
        debug!("transaction opened");

        let guard = TransactionGuard {
            rewriter: &mut *self,
            committed: false,
        };
        body(&mut *guard.rewriter)?;
        guard.commit();

        Ok(self)
    }

    /// Apply every committed action to the source and return the result.
    ///
    /// Actions are applied by ascending start offset; actions starting at the
    /// same offset keep their submission order. Each action is shifted by the
    /// length change of every action applied before it, so an insertion
    /// scheduled after a ranged edit with the same start, or placed inside a
    /// removed range, lands early. Such positions are clamped into the text.
    pub fn process(&self) -> Result<String, RewriteError> {
        if self.is_in_transaction() {
            return Err(StateError::ProcessInTransaction.into());
        }

        let mut out = self.buffer.source().to_string();
        let mut delta: isize = 0;

        for action in apply_order(self.live.actions()) {
            let range = action.range();
            let begin = splice_offset(&out, range.begin, delta);
            let end = splice_offset(&out, range.end, delta).max(begin);
            trace!("splicing {action} at {begin}..{end}");
            out.replace_range(begin..end, action.replacement());
            delta += action.delta();
        }

        Ok(out)
    }

    fn schedule(&mut self, range: Range, text: String) -> Result<&mut Self, RewriteError> {
        if !self.buffer.is_valid_range(range) {
            return Err(RewriteError::InvalidRange {
                begin: range.begin,
                end: range.end,
                len: self.buffer.len(),
            });
        }

        let action = Action::new(range, text, self.next_order);
        self.next_order += 1;

        let queue = match &mut self.pending {
            Some(pending) => pending,
            None => &mut self.live,
        };

        match queue.admit(action) {
            Ok(Admitted::Appended) => {
                debug!("scheduled action at {range}");
                Ok(self)
            }
            Ok(Admitted::Merged(count)) => {
                debug!("merged action at {range} with {count} queued action(s)");
                Ok(self)
            }
            Err(clobbered) => {
                debug!(
                    "rejected {} at {range}: clobbers {}",
                    clobbered.action, clobbered.colliding
                );
                self.diagnostics
                    .process(Diagnostic::rejected(clobbered.action.clone()));
                self.diagnostics
                    .process(Diagnostic::collided_with(clobbered.colliding.clone()));
                Err(ConflictError {
                    action: clobbered.action,
                    colliding: clobbered.colliding,
                }
                .into())
            }
        }
    }
}

/// Discards the transaction snapshot unless committed, on every exit path.
struct TransactionGuard<'r, 's, D: DiagnosticSink> {
    rewriter: &'r mut Rewriter<'s, D>,
    committed: bool,
}

impl<D: DiagnosticSink> TransactionGuard<'_, '_, D> {
    fn commit(mut self) {
        if let Some(pending) = self.rewriter.pending.take() {
            self.rewriter.live = pending;
        }
        self.committed = true;
        debug!("transaction committed");
    }
}

impl<D: DiagnosticSink> Drop for TransactionGuard<'_, '_, D> {
    fn drop(&mut self) {
        if !self.committed {
            self.rewriter.pending = None;
            debug!("transaction rolled back");
        }
    }
}

fn apply_order(actions: &[Action]) -> Vec<&Action> {
    let mut sorted: Vec<&Action> = actions.iter().collect();
    sorted.sort_by_key(|action| (action.range().begin, action.order()));
    sorted
}

/// Shift a source offset into the working text, clamped onto a character
/// boundary inside it.
fn splice_offset(text: &str, offset: usize, delta: isize) -> usize {
    let mut pos = (offset as isize + delta).clamp(0, text.len() as isize) as usize;
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter(buffer: &SourceBuffer) -> Rewriter<'_, Vec<Diagnostic>> {
        Rewriter::with_sink(buffer, Vec::new())
    }

    #[test]
    fn test_process_without_edits_returns_source() {
        let buffer = SourceBuffer::new("t", "hello world");
        assert_eq!(rewriter(&buffer).process().unwrap(), "hello world");
    }

    #[test]
    fn test_edits_in_any_order() {
        let buffer = SourceBuffer::new("t", "hello world");
        let mut rw = rewriter(&buffer);
        rw.replace(Range::new(6, 11), "rust")
            .unwrap()
            .replace(Range::new(0, 5), "goodbye")
            .unwrap();
        assert_eq!(rw.process().unwrap(), "goodbye rust");
    }

    #[test]
    fn test_wrap() {
        let buffer = SourceBuffer::new("t", "foo(x)");
        let mut rw = rewriter(&buffer);
        rw.wrap(Range::new(4, 5), "&", ".clone()").unwrap();
        assert_eq!(rw.process().unwrap(), "foo(&x.clone())");
    }

    #[test]
    fn test_invalid_range_is_refused() {
        let buffer = SourceBuffer::new("t", "héllo");
        let mut rw = rewriter(&buffer);
        assert!(matches!(
            rw.remove(Range::new(3, 9)),
            Err(RewriteError::InvalidRange { len: 6, .. })
        ));
        assert!(matches!(
            rw.remove(Range::new(0, 2)),
            Err(RewriteError::InvalidRange { .. })
        ));
        assert!(rw.diagnostics().is_empty());
    }

    #[test]
    fn test_conflict_emits_error_then_note() {
        let buffer = SourceBuffer::new("t", "abcdef");
        let mut rw = rewriter(&buffer);
        rw.replace(Range::new(0, 3), "XYZ").unwrap();

        let err = rw.replace(Range::new(2, 5), "QUV").unwrap_err();
        assert!(err.is_conflict());

        let diags = rw.diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].message(), "cannot replace 3 character(s) with \"QUV\"");
        assert_eq!(diags[1].message(), "clobbered by: replace 3 character(s) with \"XYZ\"");
        assert_eq!(rw.process().unwrap(), "XYZdef");
    }

    #[test]
    fn test_diagnostics_name_both_actions() {
        let buffer = SourceBuffer::new("t", "abcdef");
        let mut rw = rewriter(&buffer);
        rw.remove(Range::new(0, 2)).unwrap();
        rw.replace(Range::new(1, 3), "zz").unwrap_err();

        // The sink can be drained between batches
        rw.diagnostics_mut().clear();
        rw.replace(Range::new(4, 6), "EF").unwrap();
        let err = rw.remove(Range::new(5, 6)).unwrap_err();
        let RewriteError::Conflict(conflict) = err else {
            panic!("expected a conflict");
        };

        let diags = rw.into_diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].payload.action(), &conflict.action);
        assert_eq!(diags[1].payload.action(), &conflict.colliding);
        assert_eq!(diags[1].payload.action().replacement(), "EF");
    }

    #[test]
    fn test_nested_transaction_is_a_state_error() {
        let buffer = SourceBuffer::new("t", "abc");
        let mut rw = rewriter(&buffer);
        let result = rw.transaction(|rw| {
            rw.transaction(|_| Ok::<(), RewriteError>(()))?;
            Ok::<(), RewriteError>(())
        });
        assert!(matches!(
            result,
            Err(RewriteError::State(StateError::NestedTransaction))
        ));
        assert!(!rw.is_in_transaction());
    }

    #[test]
    fn test_process_inside_transaction_is_a_state_error() {
        let buffer = SourceBuffer::new("t", "abc");
        let mut rw = rewriter(&buffer);
        rw.remove(Range::new(0, 1)).unwrap();

        rw.transaction(|rw| {
            rw.remove(Range::new(2, 3))?;
            assert!(matches!(
                rw.process(),
                Err(RewriteError::State(StateError::ProcessInTransaction))
            ));
            Ok::<(), RewriteError>(())
        })
        .unwrap();

        assert_eq!(rw.process().unwrap(), "b");
    }

    #[test]
    fn test_splice_offset_clamps() {
        assert_eq!(splice_offset("abc", 1, -5), 0);
        assert_eq!(splice_offset("abc", 2, 5), 3);
        assert_eq!(splice_offset("é", 1, 0), 0);
    }
}
