//! Standard library shipped with the compiler
//!
//! The library is plain Tern source embedded into the binary. Its classes
//! declare `native` methods only; they go through declaration and linking
//! but their bodies are never checked.

use crate::common::{CompileResult, DiagnosticReporter};
use crate::frontend::{Frontend, TernFrontend};
use crate::sema::CompilationUnit;

/// One embedded standard library file
#[derive(Debug, Clone, Copy)]
pub struct StdModule {
    pub path: &'static str,
    pub source: &'static str,
}

const MODULES: &[StdModule] = &[
    StdModule {
        path: "<std>/std/lang/Math.tn",
        source: include_str!("../../stdlib/std/lang/Math.tn"),
    },
    StdModule {
        path: "<std>/std/lang/Printable.tn",
        source: include_str!("../../stdlib/std/lang/Printable.tn"),
    },
    StdModule {
        path: "<std>/std/io/Console.tn",
        source: include_str!("../../stdlib/std/io/Console.tn"),
    },
    StdModule {
        path: "<std>/std/text/Texts.tn",
        source: include_str!("../../stdlib/std/text/Texts.tn"),
    },
];

pub fn modules() -> &'static [StdModule] {
    MODULES
}

/// Register and parse every standard library file
pub fn load(reporter: &mut DiagnosticReporter) -> CompileResult<Vec<CompilationUnit>> {
    let frontend = TernFrontend::new();
    MODULES
        .iter()
        .map(|module| {
            let file = reporter.add_file(module.path, module.source);
            let tree = frontend.parse(module.source, file.base)?;
            log::trace!("loaded stdlib module {}", module.path);
            Ok(CompilationUnit::stdlib(module.path, tree))
        })
        .collect()
}
