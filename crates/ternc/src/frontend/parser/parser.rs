//! Tern recursive descent parser

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Tern parser
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// End offset of the most recently consumed token
    prev_end: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_offset(source, 0)
    }

    /// Parse a file whose spans start at `base` in the global offset space
    pub fn with_offset(source: &'a str, base: usize) -> Self {
        Self {
            lexer: Lexer::with_offset(source, base),
            prev_end: base,
        }
    }

    /// Parse a complete source file
    pub fn parse_file(&mut self) -> CompileResult<SyntaxTree> {
        let start = self.lexer.peek()?.span;

        let package = if self.match_token(&TokenKind::Package)? {
            let name = self.parse_qualified_name()?;
            self.expect(TokenKind::Semi)?;
            Some(name)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.check(&TokenKind::Import)? {
            imports.push(self.parse_import()?);
        }

        let mut decls = Vec::new();
        while !self.check(&TokenKind::Eof)? {
            decls.push(self.parse_type_decl()?);
        }

        let end = self.lexer.peek()?.span;
        Ok(SyntaxTree::new(package, imports, decls, Span::new(start.start, end.end)))
    }

    // ==================== Declarations ====================

    fn parse_import(&mut self) -> CompileResult<ImportDecl> {
        let start = self.expect(TokenKind::Import)?.span;
        let first = self.expect_identifier()?;
        let mut segments = vec![first.0];
        let mut wildcard = false;

        while self.match_token(&TokenKind::Dot)? {
            if self.match_token(&TokenKind::Star)? {
                wildcard = true;
                break;
            }
            segments.push(self.expect_identifier()?.0);
        }
        let path = QualifiedName::new(segments, Span::new(first.1.start, self.prev_end));

        if !wildcard && path.is_simple() {
            return Err(CompileError::parser(
                format!("import of '{}' needs a package qualifier", path),
                path.span,
            ));
        }

        self.expect(TokenKind::Semi)?;
        Ok(ImportDecl::new(path, wildcard, Span::new(start.start, self.prev_end)))
    }

    fn parse_visibility(&mut self) -> CompileResult<Visibility> {
        if self.match_token(&TokenKind::Private)? {
            Ok(Visibility::Private)
        } else {
            self.match_token(&TokenKind::Public)?;
            Ok(Visibility::Public)
        }
    }

    fn parse_type_decl(&mut self) -> CompileResult<TypeDecl> {
        let start = self.lexer.peek()?.span;
        let visibility = self.parse_visibility()?;

        let kind = if self.match_token(&TokenKind::Class)? {
            TypeDeclKind::Class
        } else if self.match_token(&TokenKind::Interface)? {
            TypeDeclKind::Interface
        } else {
            let token = self.next()?;
            return Err(CompileError::parser(
                format!("expected class or interface, found {}", token.kind),
                token.span,
            ));
        };

        let (name, _) = self.expect_identifier()?;

        let extends = if self.match_token(&TokenKind::Extends)? {
            self.parse_name_list()?
        } else {
            Vec::new()
        };
        let implements = if self.match_token(&TokenKind::Implements)? {
            self.parse_name_list()?
        } else {
            Vec::new()
        };

        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace)? {
            let member = self.parse_member()?;
            if let MemberKind::Method(method) = &member.kind {
                // Only interface and native methods may omit the body
                if method.body.is_none() && !method.is_native && kind == TypeDeclKind::Class {
                    return Err(CompileError::parser(
                        format!("method `{}` needs a body or the `native` modifier", method.name),
                        method.span,
                    ));
                }
                if method.body.is_some() && method.is_native {
                    return Err(CompileError::parser(
                        format!("native method `{}` cannot have a body", method.name),
                        method.span,
                    ));
                }
            }
            members.push(member);
        }
        self.expect(TokenKind::RBrace)?;

        Ok(TypeDecl {
            name,
            kind,
            visibility,
            extends,
            implements,
            members,
            span: Span::new(start.start, self.prev_end),
        })
    }

    fn parse_name_list(&mut self) -> CompileResult<Vec<QualifiedName>> {
        let mut names = vec![self.parse_qualified_name()?];
        while self.match_token(&TokenKind::Comma)? {
            names.push(self.parse_qualified_name()?);
        }
        Ok(names)
    }

    fn parse_member(&mut self) -> CompileResult<Member> {
        let start = self.lexer.peek()?.span;
        let visibility = self.parse_visibility()?;

        let kind = if self.check(&TokenKind::Var)? || self.check(&TokenKind::Val)? {
            MemberKind::Field(self.parse_field(start)?)
        } else {
            MemberKind::Method(self.parse_method(start)?)
        };

        Ok(Member {
            kind,
            visibility,
            span: Span::new(start.start, self.prev_end),
        })
    }

    fn parse_field(&mut self, start: Span) -> CompileResult<FieldDecl> {
        let mutable = self.match_token(&TokenKind::Var)?;
        if !mutable {
            self.expect(TokenKind::Val)?;
        }
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let init = if self.match_token(&TokenKind::Eq)? {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;

        Ok(FieldDecl {
            name,
            mutable,
            ty,
            init,
            span: Span::new(start.start, self.prev_end),
        })
    }

    fn parse_method(&mut self, start: Span) -> CompileResult<MethodDecl> {
        let is_native = self.match_token(&TokenKind::Native)?;
        let (name, _) = self.expect_identifier()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen)? {
            let (pname, pspan) = self.expect_identifier()?;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push(Param::new(pname, ty, Span::new(pspan.start, self.prev_end)));

            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let return_type = if self.match_token(&TokenKind::Colon)? {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.check(&TokenKind::LBrace)? {
            Some(self.parse_block()?)
        } else {
            self.expect(TokenKind::Semi)?;
            None
        };

        Ok(MethodDecl {
            name,
            params,
            return_type,
            body,
            is_native,
            span: Span::new(start.start, self.prev_end),
        })
    }

    // ==================== Types ====================

    fn parse_type(&mut self) -> CompileResult<TypeExpr> {
        let start = self.lexer.peek()?.span;

        if self.match_token(&TokenKind::LBracket)? {
            let element = self.parse_type()?;
            self.expect(TokenKind::RBracket)?;
            return Ok(TypeExpr::new(
                TypeExprKind::Array(Box::new(element)),
                Span::new(start.start, self.prev_end),
            ));
        }

        if self.match_token(&TokenKind::LParen)? {
            let mut params = Vec::new();
            while !self.check(&TokenKind::RParen)? {
                params.push(self.parse_type()?);
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
            self.expect(TokenKind::Arrow)?;
            let ret = self.parse_type()?;
            return Ok(TypeExpr::new(
                TypeExprKind::Callable { params, ret: Box::new(ret) },
                Span::new(start.start, self.prev_end),
            ));
        }

        let name = self.parse_qualified_name()?;
        if name.is_simple() {
            if let Some(primitive) = PrimitiveName::from_name(name.name()) {
                return Ok(TypeExpr::primitive(primitive, name.span));
            }
        }
        let span = name.span;
        Ok(TypeExpr::new(TypeExprKind::Named(name), span))
    }

    fn parse_qualified_name(&mut self) -> CompileResult<QualifiedName> {
        let (first, span) = self.expect_identifier()?;
        let mut segments = vec![first];
        while self.check(&TokenKind::Dot)? {
            // `a.b.*` belongs to the import parser
            if !matches!(self.lexer.peek_at(1)?.kind, TokenKind::Identifier(_)) {
                break;
            }
            self.next()?;
            segments.push(self.expect_identifier()?.0);
        }
        Ok(QualifiedName::new(segments, Span::new(span.start, self.prev_end)))
    }

    // ==================== Statements ====================

    fn parse_block(&mut self) -> CompileResult<Block> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace)? {
            stmts.push(self.parse_stmt()?);
        }

        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Block::new(stmts, Span::new(start.start, end.end)))
    }

    fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        let start = self.lexer.peek()?.span;

        let kind = if self.check(&TokenKind::Var)? || self.check(&TokenKind::Val)? {
            self.parse_var_stmt()?
        } else if self.check(&TokenKind::If)? {
            return self.parse_if_stmt();
        } else if self.match_token(&TokenKind::While)? {
            let condition = self.parse_expr()?;
            let body = self.parse_block()?;
            StmtKind::While { condition, body }
        } else if self.match_token(&TokenKind::For)? {
            let (var, var_span) = self.expect_identifier()?;
            self.expect(TokenKind::In)?;
            let iter = self.parse_expr()?;
            let body = self.parse_block()?;
            StmtKind::For { var, var_span, iter, body }
        } else if self.match_token(&TokenKind::Return)? {
            let value = if self.check(&TokenKind::Semi)? {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(TokenKind::Semi)?;
            StmtKind::Return(value)
        } else if self.check(&TokenKind::LBrace)? {
            StmtKind::Block(self.parse_block()?)
        } else {
            let expr = self.parse_expr()?;
            if self.match_token(&TokenKind::Eq)? {
                if !expr.kind.is_place() {
                    return Err(CompileError::parser("invalid assignment target", expr.span));
                }
                let value = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                StmtKind::Assign { target: expr, value }
            } else {
                self.expect(TokenKind::Semi)?;
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt::new(kind, Span::new(start.start, self.prev_end)))
    }

    fn parse_var_stmt(&mut self) -> CompileResult<StmtKind> {
        let mutable = self.match_token(&TokenKind::Var)?;
        if !mutable {
            self.expect(TokenKind::Val)?;
        }
        let (name, span) = self.expect_identifier()?;

        let ty = if self.match_token(&TokenKind::Colon)? {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.match_token(&TokenKind::Eq)? {
            Some(self.parse_expr()?)
        } else {
            None
        };

        if ty.is_none() && init.is_none() {
            return Err(CompileError::parser(
                format!("'{}' needs a type annotation or an initializer", name),
                span,
            ));
        }

        self.expect(TokenKind::Semi)?;
        Ok(StmtKind::Var { name, mutable, ty, init })
    }

    fn parse_if_stmt(&mut self) -> CompileResult<Stmt> {
        let start = self.expect(TokenKind::If)?.span;
        let condition = self.parse_expr()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.match_token(&TokenKind::Else)? {
            if self.check(&TokenKind::If)? {
                Some(Box::new(self.parse_if_stmt()?))
            } else {
                let block = self.parse_block()?;
                let span = block.span;
                Some(Box::new(Stmt::new(StmtKind::Block(block), span)))
            }
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If { condition, then_block, else_branch },
            Span::new(start.start, self.prev_end),
        ))
    }

    // ==================== Expressions ====================

    pub fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_expr_with_precedence(0)
    }

    fn parse_expr_with_precedence(&mut self, min_prec: u8) -> CompileResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op()? {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            self.next()?;
            let right = self.parse_expr_with_precedence(prec + 1)?;

            let span = left.span.to(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn peek_binary_op(&mut self) -> CompileResult<Option<BinOp>> {
        Ok(match &self.lexer.peek()?.kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Rem),
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::NotEq => Some(BinOp::Ne),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::LtEq => Some(BinOp::Le),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::GtEq => Some(BinOp::Ge),
            TokenKind::AmpAmp => Some(BinOp::And),
            TokenKind::PipePipe => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_unary_expr(&mut self) -> CompileResult<Expr> {
        let start = self.lexer.peek()?.span;

        let op = if self.match_token(&TokenKind::Minus)? {
            UnaryOp::Neg
        } else if self.match_token(&TokenKind::Bang)? {
            UnaryOp::Not
        } else {
            return self.parse_postfix_expr();
        };

        let operand = self.parse_unary_expr()?;
        let span = Span::new(start.start, operand.span.end);
        Ok(Expr::new(ExprKind::Unary { op, operand: Box::new(operand) }, span))
    }

    fn parse_postfix_expr(&mut self) -> CompileResult<Expr> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            if self.match_token(&TokenKind::Dot)? {
                let (name, _) = self.expect_identifier()?;
                let span = Span::new(expr.span.start, self.prev_end);
                expr = Expr::new(ExprKind::Member { object: Box::new(expr), name }, span);
            } else if self.match_token(&TokenKind::LParen)? {
                let args = self.parse_call_args()?;
                self.expect(TokenKind::RParen)?;
                let span = Span::new(expr.span.start, self.prev_end);
                expr = Expr::new(ExprKind::Call { callee: Box::new(expr), args }, span);
            } else if self.match_token(&TokenKind::LBracket)? {
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket)?;
                let span = Span::new(expr.span.start, self.prev_end);
                expr = Expr::new(
                    ExprKind::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_call_args(&mut self) -> CompileResult<Vec<Expr>> {
        let mut args = Vec::new();

        if !self.check(&TokenKind::RParen)? {
            args.push(self.parse_expr()?);
            while self.match_token(&TokenKind::Comma)? {
                if self.check(&TokenKind::RParen)? {
                    break;
                }
                args.push(self.parse_expr()?);
            }
        }

        Ok(args)
    }

    fn parse_primary_expr(&mut self) -> CompileResult<Expr> {
        let token = self.next()?;
        let span = token.span;

        let kind = match token.kind {
            TokenKind::IntLiteral(s) => ExprKind::IntLiteral(self.parse_int_literal(&s, 10, span)?),
            TokenKind::HexLiteral(s) => {
                ExprKind::IntLiteral(self.parse_int_literal(&s[2..], 16, span)?)
            }
            TokenKind::FloatLiteral(s) => {
                let value = s.replace('_', "").parse::<f64>().map_err(|_| {
                    CompileError::parser(format!("invalid float literal '{}'", s), span)
                })?;
                ExprKind::FloatLiteral(value)
            }
            TokenKind::TextLiteral(s) => ExprKind::TextLiteral(self.parse_text_literal(&s, span)?),
            TokenKind::True => ExprKind::BoolLiteral(true),
            TokenKind::False => ExprKind::BoolLiteral(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::This => ExprKind::This,
            TokenKind::Identifier(name) => ExprKind::Identifier(name),
            TokenKind::New => {
                let class = self.parse_qualified_name()?;
                self.expect(TokenKind::LParen)?;
                self.expect(TokenKind::RParen)?;
                ExprKind::New(class)
            }
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => {
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBracket)? {
                    elements.push(self.parse_expr()?);
                    if !self.match_token(&TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket)?;
                ExprKind::Array(elements)
            }
            other => {
                return Err(CompileError::parser(
                    format!("expected expression, found {}", other),
                    span,
                ));
            }
        };

        Ok(Expr::new(kind, Span::new(span.start, self.prev_end)))
    }

    fn parse_int_literal(&self, s: &str, radix: u32, span: Span) -> CompileResult<i64> {
        let digits = s.replace('_', "");
        i64::from_str_radix(&digits, radix)
            .map_err(|_| CompileError::parser(format!("integer literal '{}' out of range", s), span))
    }

    fn parse_text_literal(&self, s: &str, span: Span) -> CompileResult<String> {
        let inner = &s[1..s.len() - 1];
        let mut result = String::with_capacity(inner.len());
        let mut chars = inner.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            let escaped = match chars.next() {
                Some('n') => '\n',
                Some('t') => '\t',
                Some('r') => '\r',
                Some('0') => '\0',
                Some('\\') => '\\',
                Some('"') => '"',
                Some(other) => {
                    return Err(CompileError::parser(
                        format!("unknown escape sequence '\\{}'", other),
                        span,
                    ));
                }
                None => return Err(CompileError::parser("unterminated escape sequence", span)),
            };
            result.push(escaped);
        }

        Ok(result)
    }

    // ==================== Token helpers ====================

    fn next(&mut self) -> CompileResult<Token> {
        let token = self.lexer.next_token()?;
        self.prev_end = token.span.end;
        Ok(token)
    }

    fn check(&mut self, expected: &TokenKind) -> CompileResult<bool> {
        self.lexer.check(expected)
    }

    fn match_token(&mut self, expected: &TokenKind) -> CompileResult<bool> {
        if self.check(expected)? {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, expected: TokenKind) -> CompileResult<Token> {
        let token = self.lexer.expect(expected)?;
        self.prev_end = token.span.end;
        Ok(token)
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, Span)> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.span)),
            _ => Err(CompileError::parser(
                format!("expected identifier, found {}", token.kind),
                token.span,
            )),
        }
    }
}
