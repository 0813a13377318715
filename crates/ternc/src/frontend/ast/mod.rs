//! Tern AST definitions

mod types;
mod expr;
mod stmt;
mod item;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use item::*;

use crate::common::Span;

/// A parsed source file: package clause, imports and type declarations
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub package: Option<QualifiedName>,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<TypeDecl>,
    pub span: Span,
}

impl SyntaxTree {
    pub fn new(package: Option<QualifiedName>, imports: Vec<ImportDecl>, decls: Vec<TypeDecl>, span: Span) -> Self {
        Self { package, imports, decls, span }
    }

    /// Dotted package name, empty for the default package
    pub fn package_name(&self) -> String {
        self.package.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}
