//! Common infrastructure shared across the frontend and semantic analysis

mod error;
mod source_map;
mod span;

pub use error::{CompileError, CompileResult, DiagnosticReporter};
pub use source_map::{FileId, SourceFile, SourceLocation, SourceMap};
pub use span::Span;
