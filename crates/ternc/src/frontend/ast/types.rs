//! Type expressions as written in source

use crate::common::Span;
use std::fmt;

/// A dotted name such as `std.io.Console`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub segments: Vec<String>,
    pub span: Span,
}

impl QualifiedName {
    pub fn new(segments: Vec<String>, span: Span) -> Self {
        Self { segments, span }
    }

    pub fn simple(name: impl Into<String>, span: Span) -> Self {
        Self::new(vec![name.into()], span)
    }

    /// Last segment
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Every segment but the last, joined with dots
    pub fn qualifier(&self) -> String {
        match self.segments.split_last() {
            Some((_, rest)) => rest.join("."),
            None => String::new(),
        }
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Built-in type keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveName {
    Int,
    Float,
    Bool,
    Text,
    Void,
}

impl PrimitiveName {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Int" => Some(Self::Int),
            "Float" => Some(Self::Float),
            "Bool" => Some(Self::Bool),
            "Text" => Some(Self::Text),
            "Void" | "void" => Some(Self::Void),
            _ => None,
        }
    }
}

/// A type as written in source, resolved to a `sema::Type` during linking
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn primitive(name: PrimitiveName, span: Span) -> Self {
        Self::new(TypeExprKind::Primitive(name), span)
    }

    /// Walk every class name mentioned in this type
    pub fn named_types(&self) -> Vec<&QualifiedName> {
        let mut names = Vec::new();
        let mut stack = vec![self];
        while let Some(ty) = stack.pop() {
            match &ty.kind {
                TypeExprKind::Primitive(_) => {}
                TypeExprKind::Named(name) => names.push(name),
                TypeExprKind::Array(element) => stack.push(element),
                TypeExprKind::Callable { params, ret } => {
                    stack.push(ret);
                    stack.extend(params.iter().rev());
                }
            }
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// Int, Float, Bool, Text, Void
    Primitive(PrimitiveName),
    /// A class or interface name, possibly qualified
    Named(QualifiedName),
    /// [T]
    Array(Box<TypeExpr>),
    /// (A, B) -> R
    Callable {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Primitive(p) => write!(f, "{:?}", p),
            TypeExprKind::Named(name) => write!(f, "{}", name),
            TypeExprKind::Array(element) => write!(f, "[{}]", element),
            TypeExprKind::Callable { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
        }
    }
}
