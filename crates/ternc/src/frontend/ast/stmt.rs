//! Statement AST nodes

use super::{Expr, TypeExpr};
use crate::common::Span;

/// A braced block of statements
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `var x: Int = 1;` / `val y = 2;`
    Var {
        name: String,
        mutable: bool,
        ty: Option<TypeExpr>,
        init: Option<Expr>,
    },
    /// `target = value;`
    Assign { target: Expr, value: Expr },
    /// `if cond { } else { }`; the else branch is a `Block` or another `If`
    If {
        condition: Expr,
        then_block: Block,
        else_branch: Option<Box<Stmt>>,
    },
    While { condition: Expr, body: Block },
    /// `for x in xs { }`
    For {
        var: String,
        var_span: Span,
        iter: Expr,
        body: Block,
    },
    Return(Option<Expr>),
    Expr(Expr),
    Block(Block),
}
