//! Diagnostics emitted when a scheduled edit clobbers another one.
//!
//! The rewriter never prints anything itself: every diagnostic goes to a
//! [`DiagnosticSink`]. [`StderrSink`] is the default; a `Vec<Diagnostic>`
//! collects them for later inspection.

use crate::action::Action;
use crate::buffer::SourceBuffer;
use crate::range::Range;
use colored::Colorize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticPayload {
    /// The action that was refused
    RejectedAction { action: Action },
    /// An already queued action the refused one collided with
    CollidedWith { action: Action },
}

impl DiagnosticPayload {
    pub fn action(&self) -> &Action {
        match self {
            DiagnosticPayload::RejectedAction { action }
            | DiagnosticPayload::CollidedWith { action } => action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub payload: DiagnosticPayload,
    pub location: Range,
}

impl Diagnostic {
    /// Error describing an action that could not be scheduled.
    pub fn rejected(action: Action) -> Self {
        Self {
            level: Level::Error,
            location: action.range(),
            payload: DiagnosticPayload::RejectedAction { action },
        }
    }

    /// Note pointing at the queued action a rejected one collided with.
    pub fn collided_with(action: Action) -> Self {
        Self {
            level: Level::Note,
            location: action.range(),
            payload: DiagnosticPayload::CollidedWith { action },
        }
    }

    /// Human-readable message, e.g. `cannot remove 3 character(s)`.
    pub fn message(&self) -> String {
        match &self.payload {
            DiagnosticPayload::RejectedAction { action } => format!("cannot {action}"),
            DiagnosticPayload::CollidedWith { action } => format!("clobbered by: {action}"),
        }
    }

    /// Render with file position, the offending source line and a caret
    /// underline.
    pub fn render(&self, buffer: &SourceBuffer) -> String {
        let (line, column) = buffer.line_column(self.location.begin);
        let mut out = format!(
            "{}:{}:{}: {}: {}",
            buffer.name(),
            line,
            column,
            self.level,
            self.message()
        );

        if let Some(text) = buffer.line(line) {
            let (end_line, end_column) = buffer.line_column(self.location.end);
            let width = if end_line == line {
                end_column.saturating_sub(column).max(1)
            } else {
                text.len().saturating_sub(column - 1).max(1)
            };
            out.push('\n');
            out.push_str(text);
            out.push('\n');
            out.push_str(&" ".repeat(column - 1));
            out.push_str(&"^".repeat(width));
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.level, self.message(), self.location)
    }
}

/// Receiver for diagnostics produced while scheduling edits.
pub trait DiagnosticSink {
    fn process(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn process(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn process(&mut self, diagnostic: Diagnostic) {
        (**self).process(diagnostic);
    }
}

/// Prints every diagnostic to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn process(&mut self, diagnostic: Diagnostic) {
        let level = match diagnostic.level {
            Level::Error => "error".red().bold(),
            Level::Note => "note".cyan().bold(),
        };
        eprintln!(
            "{}: {} {}",
            level,
            diagnostic.message(),
            format!("({})", diagnostic.location).dimmed()
        );
    }
}
