//! Expression AST nodes

use super::QualifiedName;
use crate::common::Span;
use crate::sema::Type;

/// An expression. `ty` is filled in by the body checker.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span, ty: None }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    TextLiteral(String),
    BoolLiteral(bool),
    Null,
    This,
    Identifier(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `f(x)`, `obj.m(x)`; accessor calls have the same shape
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `obj.name`
    Member {
        object: Box<Expr>,
        name: String,
    },
    /// `xs[i]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `new Counter()`
    New(QualifiedName),
    /// `[1, 2, 3]`
    Array(Vec<Expr>),
}

impl ExprKind {
    /// Whether this expression may appear on the left of `=`
    pub fn is_place(&self) -> bool {
        matches!(self, ExprKind::Identifier(_) | ExprKind::Member { .. } | ExprKind::Index { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Binding power, higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne => 3,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 4,
            BinOp::Add | BinOp::Sub => 5,
            BinOp::Mul | BinOp::Div | BinOp::Rem => 6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}
