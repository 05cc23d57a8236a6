//! Span Rewriter: order-independent byte-range edit scheduling
//!
//! Schedules a batch of insertions, deletions and replacements against an
//! immutable source text and produces the rewritten text in one pass,
//! refusing edits that clobber each other.
//!
//! # Architecture
//!
//! Every edit compiles down to an [`Action`]: a byte [`Range`] plus
//! replacement text. Edits may arrive in any order, with one exception: a
//! pure insertion scheduled after a ranged edit that starts at the same
//! offset is shifted by that edit's length change (see
//! [`Rewriter::process`]). When a new action overlaps queued ones, the
//! rewriter either fuses them (their replacement texts agree on the shared
//! bytes) or rejects the new action with a [`ConflictError`] and two
//! diagnostics. Pure insertions never conflict.
//!
//! [`Rewriter::transaction`] groups edits into an all-or-nothing batch, and
//! [`Rewriter::process`] applies the committed queue.
//!
//! # Example
//!
//! ```
//! use span_rewriter::{Range, Rewriter, SourceBuffer};
//!
//! let buffer = SourceBuffer::new("main.rs", "abc");
//! let mut rewriter = Rewriter::new(&buffer);
//! let all = Range::new(0, 3);
//! rewriter.insert_before(all, "X")?.insert_after(all, "Y")?;
//!
//! // The replacement clashes with the removal, so the whole batch is dropped
//! let rolled_back = rewriter.transaction(|rw| {
//!     rw.remove(Range::new(1, 2))?;
//!     rw.replace(Range::new(1, 2), "B")?;
//!     Ok::<(), span_rewriter::RewriteError>(())
//! });
//! assert!(rolled_back.is_err());
//!
//! assert_eq!(rewriter.process()?, "XabcY");
//! # Ok::<(), span_rewriter::RewriteError>(())
//! ```

pub mod action;
pub mod buffer;
pub mod diagnostic;
pub mod merge;
pub mod output;
pub mod overlap;
pub mod range;
pub mod rewriter;
pub mod script;
pub mod verify;

// Re-exports
pub use action::Action;
pub use buffer::SourceBuffer;
pub use diagnostic::{Diagnostic, DiagnosticPayload, DiagnosticSink, Level, StderrSink};
pub use range::Range;
pub use rewriter::{ConflictError, RewriteError, Rewriter, StateError};
pub use script::{
    load_from_path, load_from_str, run_script, EditScript, RunError, RunOptions, RunReport,
    ScriptError,
};
pub use verify::EditVerification;
