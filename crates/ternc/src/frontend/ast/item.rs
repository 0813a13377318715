//! Declarations: imports, classes, interfaces and their members

use super::{Block, Expr, QualifiedName, TypeExpr};
use crate::common::Span;

/// `import a.b.C;` or `import a.b.*;`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: QualifiedName,
    pub wildcard: bool,
    pub span: Span,
}

impl ImportDecl {
    pub fn new(path: QualifiedName, wildcard: bool, span: Span) -> Self {
        Self { path, wildcard, span }
    }
}

/// Visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Class,
    Interface,
}

/// Top-level class or interface
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
    pub visibility: Visibility,
    pub extends: Vec<QualifiedName>,
    pub implements: Vec<QualifiedName>,
    pub members: Vec<Member>,
    pub span: Span,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        self.kind == TypeDeclKind::Interface
    }
}

/// A class or interface member
#[derive(Debug, Clone)]
pub struct Member {
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum MemberKind {
    Field(FieldDecl),
    Method(MethodDecl),
}

impl Member {
    pub fn name(&self) -> &str {
        match &self.kind {
            MemberKind::Field(f) => &f.name,
            MemberKind::Method(m) => &m.name,
        }
    }
}

/// `var count: Int = 0;`
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub mutable: bool,
    pub ty: TypeExpr,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `run(x: Int): Void { ... }`
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` means `Void`
    pub return_type: Option<TypeExpr>,
    pub body: Option<Block>,
    pub is_native: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

impl Param {
    pub fn new(name: String, ty: TypeExpr, span: Span) -> Self {
        Self { name, ty, span }
    }
}
