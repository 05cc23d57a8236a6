//! Feeds an [`EditScript`] into a [`Rewriter`].
//!
//! Top-level edits are scheduled one at a time in file order, then every
//! transaction group is scheduled as one all-or-nothing batch. An edit that
//! carries `expected`/`expected_hash` is checked against the source first;
//! a mismatch inside a group rolls the whole group back.

use crate::diagnostic::DiagnosticSink;
use crate::range::Range;
use crate::rewriter::{RewriteError, Rewriter};
use crate::script::schema::{EditDefinition, EditOperation, EditScript};
use log::{debug, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("{label}: expected {expected} at {range}, found {found:?}")]
    Verification {
        label: String,
        range: Range,
        expected: String,
        found: String,
    },

    #[error("{label}: {source}")]
    Rewrite {
        label: String,
        #[source]
        source: RewriteError,
    },
}

impl RunError {
    pub fn label(&self) -> &str {
        match self {
            RunError::Verification { label, .. } | RunError::Rewrite { label, .. } => label,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RunError::Rewrite { source, .. } if source.is_conflict())
    }
}

impl From<RewriteError> for RunError {
    fn from(source: RewriteError) -> Self {
        RunError::Rewrite {
            label: "script".to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Record failing edits and groups instead of stopping at the first one
    pub keep_going: bool,
}

#[derive(Debug, Default)]
#[must_use = "RunReport should be checked for failures"]
pub struct RunReport {
    /// Edits that made it into the queue
    pub scheduled: usize,
    pub transactions_committed: usize,
    /// Failures skipped in keep-going mode
    pub failures: Vec<RunError>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Schedule every edit of `script` on `rewriter`.
pub fn run_script<D: DiagnosticSink>(
    script: &EditScript,
    rewriter: &mut Rewriter<'_, D>,
    options: RunOptions,
) -> Result<RunReport, RunError> {
    let mut report = RunReport::default();

    for (idx, edit) in script.edits.iter().enumerate() {
        let label = edit.label(|| format!("edits[{idx}]"));
        match apply_edit(rewriter, edit, &label) {
            Ok(()) => report.scheduled += 1,
            Err(err) if options.keep_going => {
                warn!("skipping {label}: {err}");
                report.failures.push(err);
            }
            Err(err) => return Err(err),
        }
    }

    for (idx, group) in script.transactions.iter().enumerate() {
        let name = group.label(idx);
        let result = rewriter.transaction(|rw| {
            for (edit_idx, edit) in group.edits.iter().enumerate() {
                let label = edit.label(|| format!("{name}.edits[{edit_idx}]"));
                apply_edit(rw, edit, &label)?;
            }
            Ok::<(), RunError>(())
        });

        match result {
            Ok(_) => {
                debug!("committed transaction {name}");
                report.transactions_committed += 1;
                report.scheduled += group.edits.len();
            }
            Err(err) if options.keep_going => {
                warn!("rolled back transaction {name}: {err}");
                report.failures.push(err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}

fn apply_edit<D: DiagnosticSink>(
    rewriter: &mut Rewriter<'_, D>,
    edit: &EditDefinition,
    label: &str,
) -> Result<(), RunError> {
    let range = edit.range();

    if let (Some(verification), Some(found)) = (edit.verification(), rewriter.buffer().slice(range)) {
        if !verification.matches(found) {
            return Err(RunError::Verification {
                label: label.to_string(),
                range,
                expected: verification.to_string(),
                found: found.to_string(),
            });
        }
    }

    let scheduled = match &edit.operation {
        EditOperation::Remove => rewriter.remove(range),
        EditOperation::InsertBefore { text } => rewriter.insert_before(range, text.as_str()),
        EditOperation::InsertAfter { text } => rewriter.insert_after(range, text.as_str()),
        EditOperation::Replace { text } => rewriter.replace(range, text.as_str()),
        EditOperation::Wrap { before, after } => {
            rewriter.wrap(range, before.as_str(), after.as_str())
        }
    };

    scheduled.map(|_| ()).map_err(|source| RunError::Rewrite {
        label: label.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SourceBuffer;
    use crate::diagnostic::Diagnostic;
    use crate::script::load_from_str;

    fn rewriter(buffer: &SourceBuffer) -> Rewriter<'_, Vec<Diagnostic>> {
        Rewriter::with_sink(buffer, Vec::new())
    }

    #[test]
    fn test_run_script_schedules_everything() {
        let buffer = SourceBuffer::new("t.rs", "let foo = x;");
        let script = load_from_str(
            r#"
[[edits]]
kind = "replace"
begin = 4
end = 7
text = "bar"
expected = "foo"

[[transactions]]
[[transactions.edits]]
kind = "wrap"
begin = 10
end = 11
before = "Some("
after = ")"
"#,
        )
        .unwrap();

        let mut rw = rewriter(&buffer);
        let report = run_script(&script, &mut rw, RunOptions::default()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.scheduled, 2);
        assert_eq!(report.transactions_committed, 1);
        assert_eq!(rw.process().unwrap(), "let bar = Some(x);");
    }

    #[test]
    fn test_verification_mismatch_stops_run() {
        let buffer = SourceBuffer::new("t.rs", "let foo = x;");
        let script = load_from_str(
            "[[edits]]\nkind = \"remove\"\nbegin = 4\nend = 7\nexpected = \"baz\"\n",
        )
        .unwrap();

        let mut rw = rewriter(&buffer);
        let err = run_script(&script, &mut rw, RunOptions::default()).unwrap_err();
        assert!(matches!(err, RunError::Verification { ref found, .. } if found == "foo"));
        assert_eq!(err.label(), "edits[0]");
        assert_eq!(rw.process().unwrap(), "let foo = x;");
    }

    #[test]
    fn test_failed_group_rolls_back_in_keep_going_mode() {
        let buffer = SourceBuffer::new("t.rs", "abcdef");
        let script = load_from_str(
            r#"
[[edits]]
id = "keep"
kind = "replace"
begin = 0
end = 1
text = "A"

[[transactions]]
name = "clash"
[[transactions.edits]]
kind = "remove"
begin = 4
end = 6
[[transactions.edits]]
kind = "replace"
begin = 0
end = 2
text = "xy"
"#,
        )
        .unwrap();

        let mut rw = rewriter(&buffer);
        let report = run_script(&script, &mut rw, RunOptions { keep_going: true }).unwrap();
        assert_eq!(report.scheduled, 1);
        assert_eq!(report.transactions_committed, 0);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].is_conflict());
        assert_eq!(report.failures[0].label(), "clash.edits[1]");
        assert_eq!(rw.diagnostics().len(), 2);
        assert_eq!(rw.process().unwrap(), "Abcdef");
    }

    #[test]
    fn test_hash_verification() {
        let buffer = SourceBuffer::new("t.rs", "hello world");
        let hash = crate::verify::digest_of("world");
        let script = load_from_str(&format!(
            "[[edits]]\nkind = \"replace\"\nbegin = 6\nend = 11\ntext = \"rust\"\nexpected_hash = \"{hash:016x}\"\n"
        ))
        .unwrap();

        let mut rw = rewriter(&buffer);
        run_script(&script, &mut rw, RunOptions::default()).unwrap();
        assert_eq!(rw.process().unwrap(), "hello rust");
    }
}
