//! Semantic diagnostics
//!
//! Diagnostics are collected, never thrown: every pass pushes into a
//! [`Diagnostics`] sink and keeps going with the next sibling declaration.

use crate::common::{SourceMap, Span};
use codespan_reporting::diagnostic::{Diagnostic as Report, Label};
use std::fmt;
use thiserror::Error;

/// Category of a semantic diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateClass,
    DuplicateSymbolInScope,
    UndeclaredType,
    UndeclaredSymbol,
    UnresolvedImport,
    InheritanceCycle,
    InvalidSupertype,
    MissingInterfaceMethod,
    TypeMismatch,
    ImmutableAssignment,
    VisibilityViolation,
    MissingOrDuplicateEntryPoint,
    ArityMismatch,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::DuplicateClass => "duplicate-class",
            ErrorKind::DuplicateSymbolInScope => "duplicate-symbol",
            ErrorKind::UndeclaredType => "undeclared-type",
            ErrorKind::UndeclaredSymbol => "undeclared-symbol",
            ErrorKind::UnresolvedImport => "unresolved-import",
            ErrorKind::InheritanceCycle => "inheritance-cycle",
            ErrorKind::InvalidSupertype => "invalid-supertype",
            ErrorKind::MissingInterfaceMethod => "missing-interface-method",
            ErrorKind::TypeMismatch => "type-mismatch",
            ErrorKind::ImmutableAssignment => "immutable-assignment",
            ErrorKind::VisibilityViolation => "visibility",
            ErrorKind::MissingOrDuplicateEntryPoint => "entry-point",
            ErrorKind::ArityMismatch => "arity-mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A semantic error or warning attached to a global source offset
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{severity}[{kind}]: {message}")]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<Span>,
    pub severity: Severity,
    /// Secondary locations, e.g. the first declaration of a duplicate
    pub notes: Vec<(String, Option<Span>)>,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, message: impl Into<String>, span: impl Into<Option<Span>>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: span.into(),
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn warning(kind: ErrorKind, message: impl Into<String>, span: impl Into<Option<Span>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message, span)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>, span: impl Into<Option<Span>>) -> Self {
        self.notes.push((note.into(), span.into()));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Start offset, if the diagnostic points into source
    pub fn offset(&self) -> Option<usize> {
        self.span.map(|s| s.start)
    }

    /// Convert into a codespan report with labels in file-local coordinates
    pub fn to_report(&self, sources: &SourceMap) -> Report<usize> {
        let report = match self.severity {
            Severity::Error => Report::error(),
            Severity::Warning => Report::warning(),
        }
        .with_message(&self.message)
        .with_code(self.kind.name());

        let mut labels = Vec::new();
        if let Some((file, local)) = self.span.and_then(|s| sources.lookup(s)) {
            labels.push(Label::primary(file, local.range()));
        }
        let mut notes = Vec::new();
        for (note, span) in &self.notes {
            match span.and_then(|s| sources.lookup(s)) {
                Some((file, local)) => labels.push(Label::secondary(file, local.range()).with_message(note)),
                None => notes.push(note.clone()),
            }
        }
        report.with_labels(labels).with_notes(notes)
    }

    /// `file:line:column: severity: message`, or just the message when the
    /// span cannot be mapped
    pub fn render_plain(&self, sources: &SourceMap) -> String {
        match self.offset().and_then(|o| sources.location(o)) {
            Some(location) => format!("{}: {}: {}", location, self.severity, self.message),
            None => format!("{}: {}", self.severity, self.message),
        }
    }
}

/// Collector for diagnostics of one analysis run
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::trace!("diagnostic: {}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn error(&mut self, kind: ErrorKind, message: impl Into<String>, span: impl Into<Option<Span>>) {
        self.push(Diagnostic::error(kind, message, span));
    }

    pub fn warning(&mut self, kind: ErrorKind, message: impl Into<String>, span: impl Into<Option<Span>>) {
        self.push(Diagnostic::warning(kind, message, span));
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Split into (errors, warnings), both sorted by source offset
    pub fn partition(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        let (mut errors, mut warnings): (Vec<_>, Vec<_>) = self.items.into_iter().partition(Diagnostic::is_error);
        // Stable: diagnostics at the same offset keep their pass order
        errors.sort_by_key(|d| d.offset().unwrap_or(usize::MAX));
        warnings.sort_by_key(|d| d.offset().unwrap_or(usize::MAX));
        (errors, warnings)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_sorts_by_offset() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.error(ErrorKind::TypeMismatch, "late", Span::new(40, 41));
        diagnostics.warning(ErrorKind::UnresolvedImport, "dup import", Span::new(3, 5));
        diagnostics.error(ErrorKind::UndeclaredType, "early", Span::new(10, 12));
        diagnostics.error(ErrorKind::MissingOrDuplicateEntryPoint, "no entry", None);

        assert_eq!(diagnostics.error_count(), 3);
        let (errors, warnings) = diagnostics.partition();
        let messages: Vec<_> = errors.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["early", "late", "no entry"]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_render_plain() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("main.tn", "class A {}\nclass A {}\n");
        let diagnostic = Diagnostic::error(
            ErrorKind::DuplicateClass,
            "class `A` is already declared",
            Span::new(11, 21).shifted(file.base),
        );

        assert_eq!(
            diagnostic.render_plain(&sources),
            "main.tn:2:1: error: class `A` is already declared"
        );
        assert_eq!(diagnostic.to_string(), "error[duplicate-class]: class `A` is already declared");
    }
}
