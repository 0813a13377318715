//! Semantic analysis for Tern
//!
//! Turns parsed compilation units into a resolved, type-checked [`Program`].

mod analyzer;
mod body;
mod diagnostic;
mod program;
mod resolver;
mod scope;
mod symbol;
mod types;

pub use analyzer::{analyze, Analyzer, AnalyzerConfig};
pub use diagnostic::{Diagnostic, Diagnostics, ErrorKind, Severity};
pub use program::{CompilationUnit, ImportTable, Program, UnitState};
pub use resolver::PRELUDE;
pub use scope::{DuplicateSymbol, Scope, ScopeId, ScopeKind, SymbolTable};
pub use symbol::{ClassState, ClassSymbol, MethodSymbol, Symbol, SymbolId, SymbolKind, UnitId, VariableSymbol};
pub use types::{ClassHierarchy, NoHierarchy, PrimitiveType, Type};
