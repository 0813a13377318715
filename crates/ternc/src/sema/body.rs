//! Pass 3: method body and field initializer checking
//!
//! Every checked expression is annotated with its type. Checking an
//! expression yields `None` once an error has been reported for it, so
//! enclosing expressions stay silent instead of piling up follow-up errors.

use super::diagnostic::{Diagnostic, Diagnostics, ErrorKind};
use super::program::CompilationUnit;
use super::resolver::{lookup_class, lookup_error, resolve_type, ClassLookup};
use super::scope::{ScopeId, ScopeKind, SymbolTable};
use super::symbol::{Symbol, SymbolId, SymbolKind, VariableSymbol};
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::*;

/// What a call expression invokes
enum Callee {
    Method(SymbolId),
    /// A field called through the accessor rule
    Accessor(SymbolId),
    /// Any value of callable type
    Value(Type),
}

/// Checks the bodies of one class
pub struct BodyChecker<'a> {
    symbols: &'a mut SymbolTable,
    unit: &'a CompilationUnit,
    diagnostics: &'a mut Diagnostics,
    class: SymbolId,
    scope: ScopeId,
    return_type: Type,
}

impl<'a> BodyChecker<'a> {
    pub fn new(
        symbols: &'a mut SymbolTable,
        unit: &'a CompilationUnit,
        diagnostics: &'a mut Diagnostics,
        class: SymbolId,
        class_scope: ScopeId,
    ) -> Self {
        Self {
            symbols,
            unit,
            diagnostics,
            class,
            scope: class_scope,
            return_type: Type::VOID,
        }
    }

    /// Check field initializers and method bodies of `decl`
    pub fn check_class(&mut self, decl: &mut TypeDecl) {
        let Some(info) = self.symbols.class(self.class) else {
            return;
        };
        let class_scope = info.members;
        let fields = info.fields.clone();
        let methods = info.methods.clone();

        for (index, member) in decl.members.iter_mut().enumerate() {
            self.scope = class_scope;
            match &mut member.kind {
                MemberKind::Field(field) => {
                    let Some(init) = &mut field.init else {
                        continue;
                    };
                    let symbol = fields.iter().copied().find(|f| self.symbols.symbol(*f).span == field.span);
                    let target = symbol.and_then(|f| self.value_type(f));
                    let Some(ty) = self.check_expr(init, target.as_ref()) else {
                        continue;
                    };
                    if let Some(target) = target {
                        self.expect_assignable(&target, &ty, init.span);
                    }
                }
                MemberKind::Method(method) => {
                    let symbol = methods.iter().copied().find(|m| {
                        self.symbols.symbol(*m).as_method().is_some_and(|m| m.member_index == index)
                    });
                    if let Some(symbol) = symbol {
                        self.check_method(symbol, method, class_scope);
                    }
                }
            }
        }
    }

    fn check_method(&mut self, method: SymbolId, decl: &mut MethodDecl, class_scope: ScopeId) {
        let Some(info) = self.symbols.symbol(method).as_method() else {
            return;
        };
        // Unresolved signature: already reported, skip the body
        if info.poisoned {
            return;
        }
        let Some(body) = &mut decl.body else {
            return;
        };
        log::trace!("checking body of `{}`", decl.name);

        let params = info.params.clone();
        self.return_type = info.return_type.clone();
        self.scope = self.symbols.push_scope(ScopeKind::Method(method), class_scope);

        for param in params {
            if let Err(dup) = self.symbols.bind(self.scope, param) {
                let symbol = self.symbols.symbol(param);
                let diagnostic = Diagnostic::error(
                    ErrorKind::DuplicateSymbolInScope,
                    format!("parameter `{}` is declared more than once", symbol.name),
                    symbol.span,
                )
                .with_note("first declared here", self.symbols.symbol(dup.existing).span);
                self.diagnostics.push(diagnostic);
            }
        }

        // Parameters and top-level locals share the method scope
        self.check_stmts(&mut body.stmts);
    }

    // ==================== Statements ====================

    fn check_block(&mut self, block: &mut Block) {
        let outer = self.scope;
        self.scope = self.symbols.push_scope(ScopeKind::Block, outer);
        self.check_stmts(&mut block.stmts);
        self.scope = outer;
    }

    fn check_stmts(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::Var { name, mutable, ty, init } => self.check_var(name, *mutable, ty.as_ref(), init.as_mut(), span),
            StmtKind::Assign { target, value } => self.check_assign(target, value),
            StmtKind::If { condition, then_block, else_branch } => {
                self.expect_condition(condition);
                self.check_block(then_block);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.expect_condition(condition);
                self.check_block(body);
            }
            StmtKind::For { var, var_span, iter, body } => self.check_for(var, *var_span, iter, body),
            StmtKind::Return(value) => self.check_return(value.as_mut(), span),
            StmtKind::Expr(expr) => {
                self.check_expr(expr, None);
            }
            StmtKind::Block(block) => self.check_block(block),
        }
    }

    fn check_var(&mut self, name: &str, mutable: bool, ty: Option<&TypeExpr>, init: Option<&mut Expr>, span: Span) {
        let mut poisoned = false;
        let declared = match ty.map(|ty| resolve_type(self.symbols, self.unit, ty)) {
            Some(Ok(ty)) if ty.is_void() => {
                self.diagnostics
                    .error(ErrorKind::TypeMismatch, format!("variable `{}` cannot have type Void", name), span);
                poisoned = true;
                None
            }
            Some(Ok(ty)) => Some(ty),
            Some(Err(diagnostic)) => {
                self.diagnostics.push(diagnostic);
                poisoned = true;
                None
            }
            None => None,
        };

        let inferred = match init {
            Some(init) => {
                let init_span = init.span;
                match self.check_expr(init, declared.as_ref()) {
                    Some(value) => match &declared {
                        Some(declared) => {
                            self.expect_assignable(declared, &value, init_span);
                            None
                        }
                        None if value.is_void() || value.is_null() => {
                            self.diagnostics.error(
                                ErrorKind::TypeMismatch,
                                format!("cannot infer the type of `{}` from {}", name, self.symbols.display_type(&value)),
                                init_span,
                            );
                            poisoned = true;
                            None
                        }
                        None => Some(value),
                    },
                    None => {
                        poisoned |= declared.is_none();
                        None
                    }
                }
            }
            None => None,
        };

        let ty = declared.or(inferred).unwrap_or(Type::VOID);
        let symbol = VariableSymbol {
            poisoned,
            ..VariableSymbol::local(ty, mutable)
        };
        self.define_local(name, symbol, span);
    }

    fn define_local(&mut self, name: &str, variable: VariableSymbol, span: Span) {
        let symbol = Symbol::new(name, Visibility::Public, span, SymbolKind::Variable(variable));
        if let Err(dup) = self.symbols.define(self.scope, symbol) {
            let diagnostic = Diagnostic::error(
                ErrorKind::DuplicateSymbolInScope,
                format!("`{}` is already declared in this scope", name),
                span,
            )
            .with_note("first declared here", self.symbols.symbol(dup.existing).span);
            self.diagnostics.push(diagnostic);
        }
    }

    fn check_assign(&mut self, target: &mut Expr, value: &mut Expr) {
        let place = self.check_place(target);
        let value_span = value.span;
        match place {
            Some((ty, true)) => {
                if let Some(value) = self.check_expr(value, Some(&ty)) {
                    self.expect_assignable(&ty, &value, value_span);
                }
            }
            // Immutable target: reported once, the value's type no longer matters
            Some((ty, false)) => {
                self.check_expr(value, Some(&ty));
            }
            None => {
                self.check_expr(value, None);
            }
        }
    }

    /// Type and mutability of an assignment target
    fn check_place(&mut self, target: &mut Expr) -> Option<(Type, bool)> {
        let span = target.span;
        if let ExprKind::Index { .. } = target.kind {
            // Array elements are always writable
            let ty = self.check_expr(target, None)?;
            return Some((ty, true));
        }
        if !matches!(target.kind, ExprKind::Identifier(_) | ExprKind::Member { .. }) {
            self.check_expr(target, None);
            self.diagnostics
                .error(ErrorKind::TypeMismatch, "left side of `=` is not assignable", span);
            return None;
        }

        let (symbol, ty) = match &mut target.kind {
            ExprKind::Identifier(name) => {
                let symbol = self.resolve_name(name, span)?;
                (symbol, self.value_type(symbol)?)
            }
            ExprKind::Member { object, name } => {
                let class = self.receiver_class(object)?;
                let symbol = self.member_of(class, name, span)?;
                (symbol, self.value_type(symbol)?)
            }
            _ => return None,
        };
        target.ty = Some(ty.clone());

        let Some(variable) = self.symbols.symbol(symbol).as_variable() else {
            let name = self.symbols.symbol(symbol).name.clone();
            self.diagnostics
                .error(ErrorKind::ImmutableAssignment, format!("cannot assign to method `{}`", name), span);
            return Some((ty, false));
        };
        if !variable.mutable {
            let symbol = self.symbols.symbol(symbol);
            let diagnostic = Diagnostic::error(
                ErrorKind::ImmutableAssignment,
                format!("cannot assign twice to immutable {} `{}`", symbol.kind_name(), symbol.name),
                span,
            )
            .with_note("declared here", symbol.span);
            self.diagnostics.push(diagnostic);
            return Some((ty, false));
        }
        Some((ty, true))
    }

    fn check_for(&mut self, var: &str, var_span: Span, iter: &mut Expr, body: &mut Block) {
        let iter_span = iter.span;
        let element = match self.check_expr(iter, None) {
            Some(Type::Array(element)) => Some(*element),
            Some(other) => {
                self.diagnostics.error(
                    ErrorKind::TypeMismatch,
                    format!("`for` expects an array, found {}", self.symbols.display_type(&other)),
                    iter_span,
                );
                None
            }
            None => None,
        };

        let outer = self.scope;
        self.scope = self.symbols.push_scope(ScopeKind::Block, outer);
        let variable = VariableSymbol {
            poisoned: element.is_none(),
            ..VariableSymbol::local(element.unwrap_or(Type::VOID), false)
        };
        self.define_local(var, variable, var_span);
        self.check_stmts(&mut body.stmts);
        self.scope = outer;
    }

    fn check_return(&mut self, value: Option<&mut Expr>, span: Span) {
        let expected = self.return_type.clone();
        match value {
            Some(value) => {
                let value_span = value.span;
                let Some(ty) = self.check_expr(value, Some(&expected)) else {
                    return;
                };
                if expected.is_void() {
                    self.diagnostics
                        .error(ErrorKind::TypeMismatch, "method returns Void but a value is returned", value_span);
                } else {
                    self.expect_assignable(&expected, &ty, value_span);
                }
            }
            None if !expected.is_void() => {
                self.diagnostics.error(
                    ErrorKind::TypeMismatch,
                    format!("missing return value of type {}", self.symbols.display_type(&expected)),
                    span,
                );
            }
            None => {}
        }
    }

    fn expect_condition(&mut self, condition: &mut Expr) {
        let span = condition.span;
        if let Some(ty) = self.check_expr(condition, Some(&Type::BOOL)) {
            if !ty.is_bool() {
                self.diagnostics.error(
                    ErrorKind::TypeMismatch,
                    format!("condition must be Bool, found {}", self.symbols.display_type(&ty)),
                    span,
                );
            }
        }
    }

    fn expect_assignable(&mut self, target: &Type, source: &Type, span: Span) -> bool {
        if self.symbols.is_assignable(target, source) {
            return true;
        }
        self.diagnostics.error(
            ErrorKind::TypeMismatch,
            format!(
                "expected {}, found {}",
                self.symbols.display_type(target),
                self.symbols.display_type(source)
            ),
            span,
        );
        false
    }

    // ==================== Names and members ====================

    /// Resolve an unqualified value name: locals and own members through the
    /// scope chain, then inherited members
    fn resolve_name(&mut self, name: &str, span: Span) -> Option<SymbolId> {
        let lexical = self
            .symbols
            .resolve(self.scope, name)
            .filter(|id| self.symbols.symbol(*id).as_class().is_none());
        if lexical.is_some() {
            return lexical;
        }
        if self.symbols.lookup_member(self.class, name).is_some() {
            return self.member_of(self.class, name, span);
        }

        let message = if self.symbols.resolve_local(self.symbols.global(), name).is_some() {
            format!("expected a value, found class `{}`", name)
        } else {
            format!("cannot find `{}` in this scope", name)
        };
        self.diagnostics.error(ErrorKind::UndeclaredSymbol, message, span);
        None
    }

    /// Member lookup through a receiver class; never walks the lexical chain
    fn member_of(&mut self, class: SymbolId, name: &str, span: Span) -> Option<SymbolId> {
        let Some(member) = self.symbols.lookup_member(class, name) else {
            let class_name = self.symbols.symbol(class).name.clone();
            self.diagnostics.error(
                ErrorKind::UndeclaredSymbol,
                format!("no member `{}` in `{}`", name, class_name),
                span,
            );
            return None;
        };

        if !self.symbols.is_accessible(member, Some(self.class)) {
            let symbol = self.symbols.symbol(member);
            let owner = symbol.owner().map(|o| self.symbols.symbol(o).name.clone()).unwrap_or_default();
            let diagnostic = Diagnostic::error(
                ErrorKind::VisibilityViolation,
                format!("{} `{}` is private to `{}`", symbol.kind_name(), name, owner),
                span,
            )
            .with_note("declared here", symbol.span);
            self.diagnostics.push(diagnostic);
            return None;
        }
        Some(member)
    }

    /// Class of a member-access receiver
    fn receiver_class(&mut self, object: &mut Expr) -> Option<SymbolId> {
        let span = object.span;
        let ty = self.check_expr(object, None)?;
        match ty.class_id() {
            Some(class) => Some(class),
            None => {
                self.diagnostics.error(
                    ErrorKind::TypeMismatch,
                    format!("type {} has no members", self.symbols.display_type(&ty)),
                    span,
                );
                None
            }
        }
    }

    /// Type of a symbol used as a value; `None` if its declaration failed
    fn value_type(&self, symbol: SymbolId) -> Option<Type> {
        match &self.symbols.symbol(symbol).kind {
            SymbolKind::Variable(v) if v.poisoned => None,
            SymbolKind::Variable(v) => Some(v.ty.clone()),
            SymbolKind::Method(m) if m.poisoned => None,
            SymbolKind::Method(_) => self.symbols.method_type(symbol),
            SymbolKind::Class(_) => None,
        }
    }

    // ==================== Expressions ====================

    /// Check an expression and annotate it with its type
    fn check_expr(&mut self, expr: &mut Expr, expected: Option<&Type>) -> Option<Type> {
        let span = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::IntLiteral(_) => Some(Type::INT),
            ExprKind::FloatLiteral(_) => Some(Type::FLOAT),
            ExprKind::TextLiteral(_) => Some(Type::TEXT),
            ExprKind::BoolLiteral(_) => Some(Type::BOOL),
            ExprKind::Null => Some(Type::NULL),
            ExprKind::This => Some(Type::Class(self.class)),
            ExprKind::Identifier(name) => {
                let symbol = self.resolve_name(name, span)?;
                self.value_type(symbol)
            }
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, span),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, span),
            ExprKind::Call { callee, args } => self.check_call(callee, args, span),
            ExprKind::Member { object, name } => self.check_member(object, name, span),
            ExprKind::Index { object, index } => self.check_index(object, index),
            ExprKind::New(name) => self.check_new(name),
            ExprKind::Array(elements) => self.check_array(elements, expected, span),
        };
        expr.ty = ty.clone();
        ty
    }

    fn check_binary(&mut self, op: BinOp, left: &mut Expr, right: &mut Expr, span: Span) -> Option<Type> {
        let operand_hint = matches!(op, BinOp::And | BinOp::Or).then_some(Type::BOOL);
        let lhs = self.check_expr(left, operand_hint.as_ref());
        let rhs = self.check_expr(right, operand_hint.as_ref().or(lhs.as_ref()));
        let (lhs, rhs) = (lhs?, rhs?);

        let result = match op {
            BinOp::Add if lhs == Type::TEXT && rhs == Type::TEXT => Some(Type::TEXT),
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                (lhs.is_numeric() && lhs == rhs).then(|| lhs.clone())
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => (lhs.is_numeric() && lhs == rhs).then_some(Type::BOOL),
            BinOp::Eq | BinOp::Ne => {
                let comparable = self.symbols.is_assignable(&lhs, &rhs) || self.symbols.is_assignable(&rhs, &lhs);
                comparable.then_some(Type::BOOL)
            }
            BinOp::And | BinOp::Or => (lhs.is_bool() && rhs.is_bool()).then_some(Type::BOOL),
        };

        if result.is_none() {
            self.diagnostics.error(
                ErrorKind::TypeMismatch,
                format!(
                    "operator `{}` cannot be applied to {} and {}",
                    op.symbol(),
                    self.symbols.display_type(&lhs),
                    self.symbols.display_type(&rhs)
                ),
                span,
            );
        }
        result
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &mut Expr, span: Span) -> Option<Type> {
        let ty = self.check_expr(operand, None)?;
        let ok = match op {
            UnaryOp::Neg => ty.is_numeric(),
            UnaryOp::Not => ty.is_bool(),
        };
        if ok {
            return Some(ty);
        }
        let symbol = match op {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        };
        self.diagnostics.error(
            ErrorKind::TypeMismatch,
            format!("operator `{}` cannot be applied to {}", symbol, self.symbols.display_type(&ty)),
            span,
        );
        None
    }

    fn check_member(&mut self, object: &mut Expr, name: &str, span: Span) -> Option<Type> {
        let object_span = object.span;
        let receiver = self.check_expr(object, None)?;
        match &receiver {
            Type::Array(_) if name == "length" => Some(Type::INT),
            Type::Class(class) => {
                let member = self.member_of(*class, name, span)?;
                self.value_type(member)
            }
            other => {
                self.diagnostics.error(
                    ErrorKind::UndeclaredSymbol,
                    format!("no member `{}` on {}", name, self.symbols.display_type(other)),
                    object_span,
                );
                None
            }
        }
    }

    fn check_index(&mut self, object: &mut Expr, index: &mut Expr) -> Option<Type> {
        let (object_span, index_span) = (object.span, index.span);
        let array = self.check_expr(object, None);
        let index = self.check_expr(index, Some(&Type::INT));

        if let Some(index) = &index {
            if *index != Type::INT {
                self.diagnostics.error(
                    ErrorKind::TypeMismatch,
                    format!("array index must be Int, found {}", self.symbols.display_type(index)),
                    index_span,
                );
            }
        }
        match array? {
            Type::Array(element) => Some(*element),
            other => {
                self.diagnostics.error(
                    ErrorKind::TypeMismatch,
                    format!("cannot index into {}", self.symbols.display_type(&other)),
                    object_span,
                );
                None
            }
        }
    }

    fn check_new(&mut self, name: &QualifiedName) -> Option<Type> {
        match lookup_class(self.symbols, self.unit, name) {
            ClassLookup::Found(class) => {
                if self.symbols.class(class).is_some_and(|c| c.is_interface) {
                    self.diagnostics.error(
                        ErrorKind::TypeMismatch,
                        format!("cannot instantiate interface `{}`", name),
                        name.span,
                    );
                    return None;
                }
                Some(Type::Class(class))
            }
            other => {
                let diagnostic = lookup_error(self.symbols, name, other);
                self.diagnostics.push(diagnostic);
                None
            }
        }
    }

    fn check_array(&mut self, elements: &mut [Expr], expected: Option<&Type>, span: Span) -> Option<Type> {
        let hint = expected.and_then(Type::element_type).cloned();
        let Some((first, rest)) = elements.split_first_mut() else {
            if hint.is_none() {
                self.diagnostics.error(
                    ErrorKind::TypeMismatch,
                    "cannot infer the element type of an empty array",
                    span,
                );
            }
            return hint.map(Type::array);
        };

        let first_span = first.span;
        let first_ty = self.check_expr(first, hint.as_ref());
        let element = hint.or_else(|| first_ty.clone())?;
        let mut ok = match &first_ty {
            Some(ty) => self.expect_assignable(&element, ty, first_span),
            None => false,
        };
        for item in rest {
            let item_span = item.span;
            match self.check_expr(item, Some(&element)) {
                Some(ty) => ok &= self.expect_assignable(&element, &ty, item_span),
                None => ok = false,
            }
        }
        ok.then(|| Type::array(element))
    }

    // ==================== Calls ====================

    fn resolve_callee(&mut self, callee: &mut Expr) -> Option<Callee> {
        let span = callee.span;
        if !matches!(callee.kind, ExprKind::Identifier(_) | ExprKind::Member { .. }) {
            return self.check_expr(callee, None).map(Callee::Value);
        }
        match &mut callee.kind {
            ExprKind::Identifier(name) => {
                let symbol = self.resolve_name(name, span)?;
                self.classify_callee(symbol)
            }
            ExprKind::Member { object, name } => {
                let class = self.receiver_class(object)?;
                let member = self.member_of(class, name, span)?;
                self.classify_callee(member)
            }
            _ => None,
        }
    }

    fn check_call(&mut self, callee: &mut Expr, args: &mut [Expr], span: Span) -> Option<Type> {
        let callee_span = callee.span;
        let target = self.resolve_callee(callee);

        let Some(target) = target else {
            // Still check the arguments for their own errors
            for arg in args.iter_mut() {
                self.check_expr(arg, None);
            }
            return None;
        };

        match target {
            Callee::Method(method) => {
                let ty = self.symbols.method_type(method);
                callee.ty = ty.clone();
                match ty? {
                    Type::Callable { params, ret } => self.check_args(&params, args, span).then_some(*ret),
                    _ => None,
                }
            }
            Callee::Accessor(field) => {
                callee.ty = self.value_type(field);
                self.check_accessor(field, args, span)
            }
            Callee::Value(Type::Callable { params, ret }) => {
                callee.ty = Some(Type::Callable { params: params.clone(), ret: ret.clone() });
                self.check_args(&params, args, span).then_some(*ret)
            }
            Callee::Value(other) => {
                self.diagnostics.error(
                    ErrorKind::TypeMismatch,
                    format!("{} is not callable", self.symbols.display_type(&other)),
                    callee_span,
                );
                None
            }
        }
    }

    fn classify_callee(&self, symbol: SymbolId) -> Option<Callee> {
        match &self.symbols.symbol(symbol).kind {
            SymbolKind::Method(m) if m.poisoned => None,
            SymbolKind::Method(_) => Some(Callee::Method(symbol)),
            SymbolKind::Variable(v) if v.poisoned => None,
            // Callable-typed fields are invoked, not accessed
            SymbolKind::Variable(v) if v.is_field() && !matches!(v.ty, Type::Callable { .. }) => {
                Some(Callee::Accessor(symbol))
            }
            SymbolKind::Variable(v) => Some(Callee::Value(v.ty.clone())),
            SymbolKind::Class(_) => None,
        }
    }

    /// `f()` reads a field, `f(x)` writes a `var` field
    fn check_accessor(&mut self, field: SymbolId, args: &mut [Expr], span: Span) -> Option<Type> {
        let symbol = self.symbols.symbol(field);
        let name = symbol.name.clone();
        let declared_at = symbol.span;
        let variable = symbol.as_variable()?;
        let (ty, mutable) = (variable.ty.clone(), variable.mutable);

        match args {
            [] => Some(ty),
            [value] => {
                let value_span = value.span;
                let value_ty = self.check_expr(value, Some(&ty));
                if !mutable {
                    let diagnostic = Diagnostic::error(
                        ErrorKind::ImmutableAssignment,
                        format!("cannot set `{}`: field is declared with `val`", name),
                        span,
                    )
                    .with_note("declared here", declared_at);
                    self.diagnostics.push(diagnostic);
                    return None;
                }
                let value_ty = value_ty?;
                self.expect_assignable(&ty, &value_ty, value_span).then_some(Type::VOID)
            }
            _ => {
                for arg in args.iter_mut() {
                    self.check_expr(arg, None);
                }
                self.diagnostics.error(
                    ErrorKind::ArityMismatch,
                    format!("accessor `{}` takes 0 or 1 arguments, found {}", name, args.len()),
                    span,
                );
                None
            }
        }
    }

    /// Check argument count and types; true if the call is well-typed
    fn check_args(&mut self, params: &[Type], args: &mut [Expr], span: Span) -> bool {
        if params.len() != args.len() {
            for arg in args.iter_mut() {
                self.check_expr(arg, None);
            }
            self.diagnostics.error(
                ErrorKind::ArityMismatch,
                format!("expected {} argument(s), found {}", params.len(), args.len()),
                span,
            );
            return false;
        }

        let mut ok = true;
        for (param, arg) in params.iter().zip(args.iter_mut()) {
            let arg_span = arg.span;
            match self.check_expr(arg, Some(param)) {
                Some(ty) => ok &= self.expect_assignable(param, &ty, arg_span),
                None => ok = false,
            }
        }
        ok
    }
}
