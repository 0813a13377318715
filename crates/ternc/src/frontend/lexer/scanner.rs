//! Logos-driven scanner with a small lookahead buffer

use super::token::{Token, TokenKind};
use crate::common::{CompileError, CompileResult, Span};
use logos::Logos;
use std::collections::VecDeque;
use std::mem::discriminant;
use std::ops::Range;

/// Lexer for one Tern file. Spans are global: every offset is shifted by the
/// file's base in the source map.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    base: usize,
    lookahead: VecDeque<Token>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_offset(source, 0)
    }

    pub fn with_offset(source: &'a str, base: usize) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            base,
            lookahead: VecDeque::new(),
            finished: false,
        }
    }

    fn span(&self, range: Range<usize>) -> Span {
        Span::new(range.start, range.end).shifted(self.base)
    }

    /// `Eof` repeats forever once the source is exhausted
    fn scan(&mut self) -> CompileResult<Token> {
        let next = if self.finished { None } else { self.inner.next() };
        match next {
            Some(Ok(kind)) => Ok(Token::new(kind, self.span(self.inner.span()))),
            Some(Err(())) => Err(CompileError::lexer(
                format!("unexpected character '{}'", self.inner.slice()),
                self.span(self.inner.span()),
            )),
            None => {
                self.finished = true;
                let end = self.inner.source().len();
                Ok(Token::new(TokenKind::Eof, self.span(end..end)))
            }
        }
    }

    pub fn next_token(&mut self) -> CompileResult<Token> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    pub fn peek(&mut self) -> CompileResult<&Token> {
        self.peek_at(0)
    }

    /// Peek `distance` tokens ahead; 0 is the next token
    pub fn peek_at(&mut self, distance: usize) -> CompileResult<&Token> {
        while self.lookahead.len() <= distance {
            let token = self.scan()?;
            self.lookahead.push_back(token);
        }
        Ok(&self.lookahead[distance])
    }

    /// Does the next token have the same kind as `expected`? Payloads are
    /// ignored.
    pub fn check(&mut self, expected: &TokenKind) -> CompileResult<bool> {
        Ok(discriminant(&self.peek()?.kind) == discriminant(expected))
    }

    pub fn match_token(&mut self, expected: &TokenKind) -> CompileResult<bool> {
        let matched = self.check(expected)?;
        if matched {
            self.next_token()?;
        }
        Ok(matched)
    }

    pub fn expect(&mut self, expected: TokenKind) -> CompileResult<Token> {
        let token = self.next_token()?;
        if discriminant(&token.kind) != discriminant(&expected) {
            return Err(CompileError::parser(
                format!("expected {}, found {}", expected, token.kind),
                token.span,
            ));
        }
        Ok(token)
    }

    /// Every token up to and including `Eof`
    pub fn tokenize_all(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while tokens.last().is_none_or(|t: &Token| t.kind != TokenKind::Eof) {
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let source = "package import class interface extends implements val var native";
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Package));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Import));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Class));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Interface));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Extends));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Implements));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Val));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Var));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Native));
    }

    #[test]
    fn test_identifiers_are_not_keywords() {
        let source = "Int value variable classy";
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Identifier(s) if s == "Int"));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Identifier(s) if s == "value"));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Identifier(s) if s == "variable"));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Identifier(s) if s == "classy"));
    }

    #[test]
    fn test_literals() {
        let source = r#"42 0xFF 3.25 "hi \"there\"""#;
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::IntLiteral(s) if s == "42"));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::HexLiteral(s) if s == "0xFF"));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::FloatLiteral(s) if s == "3.25"));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::TextLiteral(s) if s == r#""hi \"there\"""#
        ));
    }

    #[test]
    fn test_member_access_on_int_is_not_float() {
        let tokens = Lexer::new("xs.length").tokenize_all().unwrap();

        assert!(matches!(&tokens[0].kind, TokenKind::Identifier(s) if s == "xs"));
        assert!(matches!(tokens[1].kind, TokenKind::Dot));
        assert!(matches!(&tokens[2].kind, TokenKind::Identifier(s) if s == "length"));
    }

    #[test]
    fn test_operators() {
        let source = "-> <= >= == != && || + - * / % ! = < >";
        let kinds: Vec<_> = Lexer::new(source)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Arrow,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Bang,
                TokenKind::Eq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let source = "class // line comment\nA /* block */ {}";
        let tokens = Lexer::new(source).tokenize_all().unwrap();

        assert!(matches!(tokens[0].kind, TokenKind::Class));
        assert!(matches!(&tokens[1].kind, TokenKind::Identifier(s) if s == "A"));
        assert!(matches!(tokens[2].kind, TokenKind::LBrace));
        assert!(matches!(tokens[3].kind, TokenKind::RBrace));
        assert!(matches!(tokens[4].kind, TokenKind::Eof));
    }

    #[test]
    fn test_spans_are_shifted_by_base() {
        let mut lexer = Lexer::with_offset("class A", 100);

        assert_eq!(lexer.next_token().unwrap().span, Span::new(100, 105));
        assert_eq!(lexer.next_token().unwrap().span, Span::new(106, 107));
        assert_eq!(lexer.next_token().unwrap().span, Span::new(107, 107));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("class @");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err, CompileError::Lexer { span, .. } if span == Span::new(6, 7)));
    }
}
