//! Frontend trait and the Tern implementation
//!
//! A frontend turns source text into a syntax tree:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into an AST whose spans live in the global offset space

pub mod ast;
pub mod lexer;
pub mod parser;

use crate::common::CompileResult;
use ast::SyntaxTree;
use lexer::{Lexer, TokenKind};
use parser::Parser;

/// Configuration options passed to frontends
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
}

/// Trait for language frontends
pub trait Frontend: Send + Sync {
    /// The name of this frontend
    fn name(&self) -> &'static str;

    /// File extensions this frontend handles, without the dot
    fn extensions(&self) -> &'static [&'static str];

    /// Parse one file. `base` is the file's offset in the source map.
    fn parse(&self, source: &str, base: usize) -> CompileResult<SyntaxTree>;

    /// Optional: dump tokens for debugging
    fn dump_tokens(&self, source: &str) -> CompileResult<String> {
        let _ = source;
        Ok(String::new())
    }

    /// Optional: dump AST for debugging
    fn dump_ast(&self, source: &str) -> CompileResult<String> {
        let _ = source;
        Ok(String::new())
    }

    fn handles(&self, extension: &str) -> bool {
        self.extensions().contains(&extension)
    }
}

/// Frontend for `.tn` sources
#[derive(Debug, Default)]
pub struct TernFrontend;

impl TernFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Frontend for TernFrontend {
    fn name(&self) -> &'static str {
        "tern"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tn"]
    }

    fn parse(&self, source: &str, base: usize) -> CompileResult<SyntaxTree> {
        Parser::with_offset(source, base).parse_file()
    }

    fn dump_tokens(&self, source: &str) -> CompileResult<String> {
        let tokens = Lexer::new(source).tokenize_all()?;
        let lines: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| format!("{:>5}..{:<5} {}", t.span.start, t.span.end, t.kind))
            .collect();
        Ok(lines.join("\n"))
    }

    fn dump_ast(&self, source: &str) -> CompileResult<String> {
        let tree = self.parse(source, 0)?;
        Ok(format!("{:#?}", tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tern_frontend_handles_tn_files() {
        let frontend = TernFrontend::new();
        assert!(frontend.handles("tn"));
        assert!(!frontend.handles("rs"));
    }

    #[test]
    fn test_dump_tokens() {
        let dump = TernFrontend::new().dump_tokens("class A {}").unwrap();
        assert_eq!(dump.lines().count(), 4);
        assert!(dump.lines().next().unwrap().contains("class"));
    }
}
