//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, NoColor, StandardStream};
use thiserror::Error;
use super::{SourceFile, SourceMap, Span};

/// Compile error with source location
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexer error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error("cannot load {path}: {message}")]
    Load { path: String, message: String },

    #[error("aborting due to {errors} previous error(s)")]
    Aborted { errors: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            _ => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output.
///
/// Owns the [`SourceMap`] so that global spans can be mapped back to the file
/// they came from when rendering.
pub struct DiagnosticReporter {
    sources: SourceMap,
    config: term::Config,
    color: ColorChoice,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            sources: SourceMap::new(),
            config: term::Config::default(),
            color: ColorChoice::Auto,
        }
    }

    pub fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> SourceFile {
        self.sources.add_file(name, source)
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// Build a codespan diagnostic whose primary label points at `span`
    pub fn labelled(&self, diagnostic: Diagnostic<usize>, span: Option<Span>, label: &str) -> Diagnostic<usize> {
        match span.and_then(|s| self.sources.lookup(s)) {
            Some((file_id, local)) => diagnostic.with_labels(vec![
                Label::primary(file_id, local.range()).with_message(label),
            ]),
            None => diagnostic,
        }
    }

    pub fn compile_error_diagnostic(&self, error: &CompileError) -> Diagnostic<usize> {
        match error {
            CompileError::Lexer { message, span } => {
                self.labelled(Diagnostic::error().with_message("Lexer error"), Some(*span), message)
            }
            CompileError::Parser { message, span } => {
                self.labelled(Diagnostic::error().with_message("Syntax error"), Some(*span), message)
            }
            CompileError::Load { path, message } => {
                Diagnostic::error().with_message(format!("cannot load {}: {}", path, message))
            }
            CompileError::Aborted { errors } => {
                Diagnostic::error().with_message(format!("aborting due to {} previous error(s)", errors))
            }
            CompileError::Io(err) => Diagnostic::error().with_message(format!("IO error: {}", err)),
        }
    }

    pub fn report_error(&self, error: &CompileError) {
        let diagnostic = self.compile_error_diagnostic(error);
        self.emit(&diagnostic);
    }

    /// Write a diagnostic to stderr
    pub fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let writer = StandardStream::stderr(self.color);
        let _ = term::emit(&mut writer.lock(), &self.config, self.sources.files(), diagnostic);
    }

    /// Render a diagnostic without colors, mostly useful for tests and dumps
    pub fn render(&self, diagnostic: &Diagnostic<usize>) -> String {
        let mut buffer = NoColor::new(Vec::new());
        let _ = term::emit(&mut buffer, &self.config, self.sources.files(), diagnostic);
        String::from_utf8_lossy(&buffer.into_inner()).into_owned()
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
