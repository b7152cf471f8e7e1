//! Diagnostics sink for per-record issues.
//!
//! Transformations push warnings here instead of logging, so they stay pure.
//! The pipeline drains the sink into `tracing` events tagged with the stream.

use std::fmt;

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// One reported issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// What the entry is about (a contact name, task id, holiday summary).
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Collected diagnostics for one stream.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, subject, message);
    }

    pub fn info(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Info, subject, message);
    }

    fn push(&mut self, severity: Severity, subject: impl Into<String>, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity,
            subject: subject.into(),
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Moves every entry of `other` into this sink.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Logs all entries for `stream` and clears the sink.
    pub fn emit(&mut self, stream: &str) {
        for entry in self.entries.drain(..) {
            match entry.severity {
                Severity::Warning => {
                    tracing::warn!(stream, subject = %entry.subject, "{}", entry.message)
                }
                Severity::Info => {
                    tracing::info!(stream, subject = %entry.subject, "{}", entry.message)
                }
            }
        }
    }
}
