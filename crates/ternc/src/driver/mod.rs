//! Compilation driver and pipeline orchestration
//!
//! The [`Loader`] turns files and directories into compilation units; the
//! [`Pipeline`] adds the standard library, runs the analyzer and renders
//! diagnostics.

use crate::common::{CompileError, CompileResult, DiagnosticReporter};
use crate::frontend::{Frontend, FrontendConfig, TernFrontend};
use crate::sema::{Analyzer, AnalyzerConfig, CompilationUnit, Diagnostic, Program};
use crate::stdlib;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for one driver run
#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    pub frontend: FrontendConfig,
    pub dump_symbols: bool,
    /// Skip the embedded standard library
    pub no_stdlib: bool,
    /// Library mode: no entry point required
    pub library: bool,
}

/// Reads source files and parses them into compilation units
pub struct Loader<'r> {
    frontend: Box<dyn Frontend>,
    reporter: &'r mut DiagnosticReporter,
    config: FrontendConfig,
}

impl<'r> Loader<'r> {
    pub fn new(reporter: &'r mut DiagnosticReporter, config: FrontendConfig) -> Self {
        Self {
            frontend: Box::new(TernFrontend::new()),
            reporter,
            config,
        }
    }

    /// Collect every source file below `paths`. Directories are walked
    /// recursively; files are returned in a stable order.
    pub fn collect_files(&self, paths: &[PathBuf]) -> CompileResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending: Vec<PathBuf> = paths.iter().rev().cloned().collect();

        while let Some(path) = pending.pop() {
            if path.is_dir() {
                let mut entries = fs::read_dir(&path)?
                    .map(|entry| entry.map(|e| e.path()))
                    .collect::<Result<Vec<_>, _>>()?;
                entries.sort();
                pending.extend(entries.into_iter().rev());
            } else if path.exists() {
                let wanted = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| self.frontend.handles(e));
                // Explicitly named files are always loaded
                if wanted || paths.contains(&path) {
                    files.push(path);
                }
            } else {
                return Err(CompileError::load(path.display().to_string(), "no such file or directory"));
            }
        }
        Ok(files)
    }

    /// Load every file below `paths`. All syntax errors are collected before
    /// giving up.
    pub fn load_paths(&mut self, paths: &[PathBuf]) -> Result<Vec<CompilationUnit>, Vec<CompileError>> {
        let files = self.collect_files(paths).map_err(|e| vec![e])?;
        log::info!("loading {} source file(s)", files.len());

        let mut units = Vec::new();
        let mut errors = Vec::new();
        for file in files {
            match self.load_file(&file) {
                Ok(unit) => units.push(unit),
                Err(err) => errors.push(err),
            }
        }
        if errors.is_empty() { Ok(units) } else { Err(errors) }
    }

    pub fn load_file(&mut self, path: &Path) -> CompileResult<CompilationUnit> {
        let source = fs::read_to_string(path)
            .map_err(|e| CompileError::load(path.display().to_string(), e.to_string()))?;
        self.load_source(path.display().to_string(), source)
    }

    /// Register `source` under `name` and parse it
    pub fn load_source(&mut self, name: String, source: String) -> CompileResult<CompilationUnit> {
        if self.config.dump_tokens {
            eprintln!("=== Tokens: {} ===", name);
            eprintln!("{}", self.frontend.dump_tokens(&source)?);
        }

        let file = self.reporter.add_file(name.clone(), source);
        let source = self.reporter.sources().source(file.id).unwrap_or_default();
        let tree = self.frontend.parse(source, file.base)?;
        log::debug!("parsed {}: {} declaration(s)", name, tree.decls.len());

        if self.config.dump_ast {
            eprintln!("=== AST: {} ===", name);
            eprintln!("{:#?}", tree);
        }
        Ok(CompilationUnit::new(name, tree))
    }
}

/// Check pipeline: load, analyze, report
pub struct Pipeline {
    config: DriverConfig,
    reporter: DiagnosticReporter,
}

impl Pipeline {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            reporter: DiagnosticReporter::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: DiagnosticReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn reporter(&self) -> &DiagnosticReporter {
        &self.reporter
    }

    /// Load and analyze `paths`, rendering every diagnostic to stderr
    pub fn check(&mut self, paths: &[PathBuf]) -> CompileResult<Program> {
        let stdlib = if self.config.no_stdlib {
            Vec::new()
        } else {
            stdlib::load(&mut self.reporter)?
        };

        let loaded = Loader::new(&mut self.reporter, self.config.frontend.clone()).load_paths(paths);
        let units = loaded.map_err(|errors| {
            for error in &errors {
                self.reporter.report_error(error);
            }
            CompileError::Aborted { errors: errors.len() }
        })?;

        let program = self.analyze(units, stdlib).map_err(|diagnostics| {
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            self.emit_all(&diagnostics);
            CompileError::Aborted { errors }
        })?;
        self.emit_all(&program.warnings);

        if self.config.dump_symbols {
            eprintln!("=== Symbols ===");
            eprint!("{}", program.dump_symbols());
        }
        Ok(program)
    }

    /// Analyze already loaded units
    pub fn analyze(&self, units: Vec<CompilationUnit>, stdlib: Vec<CompilationUnit>) -> Result<Program, Vec<Diagnostic>> {
        let config = AnalyzerConfig {
            require_entry_point: !self.config.library,
        };
        log::info!("analyzing {} unit(s) against {} stdlib unit(s)", units.len(), stdlib.len());
        Analyzer::new(config).analyze(units, stdlib)
    }

    fn emit_all(&self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.reporter.emit(&diagnostic.to_report(self.reporter.sources()));
        }
    }

    /// Render diagnostics as `file:line:column: severity: message` lines
    pub fn render_plain(&self, diagnostics: &[Diagnostic]) -> Vec<String> {
        diagnostics
            .iter()
            .map(|d| d.render_plain(self.reporter.sources()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::ErrorKind;
    use pretty_assertions::assert_eq;

    fn load(pipeline: &mut Pipeline, files: &[(&str, &str)]) -> Vec<CompilationUnit> {
        let mut loader = Loader::new(&mut pipeline.reporter, FrontendConfig::default());
        files
            .iter()
            .map(|(name, source)| loader.load_source(name.to_string(), source.to_string()).unwrap())
            .collect()
    }

    #[test]
    fn test_pipeline_reports_file_positions() {
        let mut pipeline = Pipeline::new(DriverConfig {
            library: true,
            ..DriverConfig::default()
        });
        let units = load(
            &mut pipeline,
            &[
                ("a.tn", "package app;\nclass A {}\n"),
                ("b.tn", "package app;\n\nclass A {}\n"),
            ],
        );

        let diagnostics = pipeline.analyze(units, Vec::new()).err().unwrap();
        assert_eq!(diagnostics[0].kind, ErrorKind::DuplicateClass);
        assert_eq!(
            pipeline.render_plain(&diagnostics),
            vec!["b.tn:3:1: error: class `A` is already declared".to_string()]
        );
    }

    #[test]
    fn test_missing_entry_point_outside_library_mode() {
        let mut pipeline = Pipeline::new(DriverConfig::default());
        let units = load(&mut pipeline, &[("a.tn", "class A {}")]);

        let diagnostics = pipeline.analyze(units, Vec::new()).err().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::MissingOrDuplicateEntryPoint);
    }

    #[test]
    fn test_collect_files_rejects_missing_paths() {
        let mut reporter = DiagnosticReporter::new();
        let loader = Loader::new(&mut reporter, FrontendConfig::default());
        let err = loader.collect_files(&[PathBuf::from("does/not/exist.tn")]).unwrap_err();
        assert!(matches!(err, CompileError::Load { .. }));
    }
}
