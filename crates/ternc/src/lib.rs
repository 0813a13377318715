//! Tern Compiler - front-end and semantic analyzer for the Tern language
//!
//! Tern is a statically typed, class-based language. This library takes Tern
//! sources to a fully resolved, type-checked [`sema::Program`] ready for code
//! generation.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Common** (`common/`): Shared infrastructure (errors, spans, source map)
//! - **Frontend** (`frontend/`): Lexing and parsing into a syntax tree
//! - **Sema** (`sema/`): Types, scopes, import resolution and the multi-pass analyzer
//! - **Stdlib** (`stdlib/`): Embedded standard library sources
//! - **Driver** (`driver/`): File loading and pipeline orchestration

pub mod common;
pub mod frontend;
pub mod sema;
pub mod stdlib;
pub mod driver;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, SourceMap, Span};
pub use frontend::{Frontend, FrontendConfig, TernFrontend};
pub use sema::{analyze, Analyzer, AnalyzerConfig, CompilationUnit, Diagnostic, ErrorKind, Program};
pub use driver::{DriverConfig, Loader, Pipeline};
