//! Position service: maps global offsets back to files, lines and columns

use super::Span;
use codespan_reporting::files::{Files, SimpleFiles};
use std::fmt;

/// Identifier of a file registered in a [`SourceMap`]
pub type FileId = usize;

/// A file registered in the source map together with its global base offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile {
    pub id: FileId,
    pub base: usize,
}

/// A displayable `file:line:column` triple (1-based line and column)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

struct Entry {
    id: FileId,
    base: usize,
    len: usize,
}

/// Owns all loaded sources and assigns each one a disjoint offset range.
pub struct SourceMap {
    files: SimpleFiles<String, String>,
    entries: Vec<Entry>,
    next_base: usize,
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            entries: Vec::new(),
            next_base: 0,
        }
    }

    /// Register a file. The returned base must be passed to the lexer so that
    /// every span of this file lands in its own offset range.
    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> SourceFile {
        let source = source.into();
        let len = source.len();
        let id = self.files.add(name.into(), source);
        let base = self.next_base;
        // One extra slot so the end-of-file offset stays inside this file
        self.next_base += len + 1;
        self.entries.push(Entry { id, base, len });
        SourceFile { id, base }
    }

    pub fn files(&self) -> &SimpleFiles<String, String> {
        &self.files
    }

    pub fn source(&self, id: FileId) -> Option<&str> {
        self.files.get(id).ok().map(|f| f.source().as_str())
    }

    /// Translate a global span into `(file, local byte range)`
    pub fn lookup(&self, span: Span) -> Option<(FileId, Span)> {
        let entry = self
            .entries
            .iter()
            .find(|e| span.start >= e.base && span.start <= e.base + e.len)?;
        let start = span.start - entry.base;
        let end = span.end.saturating_sub(entry.base).clamp(start, entry.len);
        Some((entry.id, Span::new(start, end)))
    }

    /// Resolve a global offset to `file:line:column`
    pub fn location(&self, offset: usize) -> Option<SourceLocation> {
        let (id, local) = self.lookup(Span::new(offset, offset))?;
        let location = self.files.location(id, local.start).ok()?;
        let file = self.files.get(id).ok()?.name().clone();
        Some(SourceLocation {
            file,
            line: location.line_number,
            column: location.column_number,
        })
    }
}

impl Default for SourceMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_disjoint() {
        let mut map = SourceMap::new();
        let a = map.add_file("a.tn", "class A {}");
        let b = map.add_file("b.tn", "class B {}");

        assert_eq!(a.base, 0);
        assert!(b.base > a.base + "class A {}".len());
        assert_eq!(map.lookup(Span::new(b.base + 6, b.base + 7)), Some((b.id, Span::new(6, 7))));
    }

    #[test]
    fn test_location() {
        let mut map = SourceMap::new();
        map.add_file("a.tn", "package a;\n");
        let b = map.add_file("b.tn", "package b;\nclass B {}\n");

        let loc = map.location(b.base + 17).unwrap();
        assert_eq!(loc.to_string(), "b.tn:2:7");
    }
}
