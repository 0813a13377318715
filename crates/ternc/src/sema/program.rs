//! Compilation units and the analyzed program

use super::diagnostic::Diagnostic;
use super::scope::{ScopeId, SymbolTable};
use super::symbol::{ClassState, SymbolId, SymbolKind};
use crate::frontend::ast::{ImportDecl, SyntaxTree};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Analysis state of a compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitState {
    /// Parsed, not yet seen by the analyzer
    #[default]
    Loaded,
    /// Class names registered in Global scope
    Declared,
    /// Imports, supertypes and signatures resolved
    Linked,
    /// Bodies type-checked
    Checked,
}

/// File-local class aliases produced by import resolution.
///
/// Keeps imported names out of Global scope: two files may import different
/// classes without affecting each other. Explicit imports win over wildcard
/// ones regardless of their order in the file.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    entries: BTreeMap<String, ImportBinding>,
}

#[derive(Debug, Clone, Copy)]
struct ImportBinding {
    class: SymbolId,
    explicit: bool,
}

impl ImportTable {
    /// Bind `name` from `import a.b.Name;`. Returns the previous explicit
    /// binding; a wildcard binding is replaced silently.
    pub fn insert_explicit(&mut self, name: impl Into<String>, class: SymbolId) -> Option<SymbolId> {
        let previous = self.entries.insert(name.into(), ImportBinding { class, explicit: true });
        previous.filter(|b| b.explicit).map(|b| b.class)
    }

    /// Bind `name` from `import a.b.*;` unless it is already bound
    pub fn insert_wildcard(&mut self, name: impl Into<String>, class: SymbolId) {
        self.entries
            .entry(name.into())
            .or_insert(ImportBinding { class, explicit: false });
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.entries.get(name).map(|b| b.class)
    }
}

/// One source file's resolved state
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub path: String,
    pub package: String,
    pub imports: Vec<ImportDecl>,
    pub tree: SyntaxTree,
    /// Lookup root for the file's bodies, assigned in Pass 1
    pub scope: Option<ScopeId>,
    pub import_table: ImportTable,
    pub state: UnitState,
    pub is_stdlib: bool,
}

impl CompilationUnit {
    pub fn new(path: impl Into<String>, tree: SyntaxTree) -> Self {
        Self {
            path: path.into(),
            package: tree.package_name(),
            imports: tree.imports.clone(),
            tree,
            scope: None,
            import_table: ImportTable::default(),
            state: UnitState::Loaded,
            is_stdlib: false,
        }
    }

    pub fn stdlib(path: impl Into<String>, tree: SyntaxTree) -> Self {
        Self {
            is_stdlib: true,
            ..Self::new(path, tree)
        }
    }
}

/// The analyzer's unit of work: every compilation unit plus the symbol table.
///
/// Standard library units come first, so [`UnitId`](super::UnitId)s of user units start at
/// `stdlib_count`.
pub struct Program {
    pub units: Vec<CompilationUnit>,
    pub symbols: SymbolTable,
    pub warnings: Vec<Diagnostic>,
    stdlib_count: usize,
}

impl Program {
    pub fn new(stdlib: Vec<CompilationUnit>, units: Vec<CompilationUnit>) -> Self {
        let stdlib_count = stdlib.len();
        let units = stdlib
            .into_iter()
            .map(|u| CompilationUnit { is_stdlib: true, ..u })
            .chain(units.into_iter().map(|u| CompilationUnit { is_stdlib: false, ..u }))
            .collect();
        Self {
            units,
            symbols: SymbolTable::new(),
            warnings: Vec::new(),
            stdlib_count,
        }
    }

    pub fn global(&self) -> ScopeId {
        self.symbols.global()
    }

    /// Units given by the caller, without the standard library
    pub fn user_units(&self) -> &[CompilationUnit] {
        &self.units[self.stdlib_count..]
    }

    /// Look a class up by simple or qualified name
    pub fn find_class(&self, name: &str) -> Option<SymbolId> {
        let (package, simple) = match name.rsplit_once('.') {
            Some((package, simple)) => (Some(package), simple),
            None => (None, name),
        };
        let id = self.symbols.resolve_local(self.global(), simple)?;
        let class = self.symbols.class(id)?;
        match package {
            Some(package) if package != class.package => None,
            _ => Some(id),
        }
    }

    pub fn class_state(&self, name: &str) -> Option<ClassState> {
        let id = self.find_class(name)?;
        self.symbols.class(id).map(|c| c.state)
    }

    /// The unique user class declaring `entry(args: [Text]): Void`
    pub fn entry_point(&self) -> Option<SymbolId> {
        let mut entries = self.symbols.classes().into_iter().filter(|id| {
            self.symbols.class(*id).is_some_and(|c| !c.from_stdlib) && self.symbols.is_entry_point(*id)
        });
        match (entries.next(), entries.next()) {
            (Some(id), None) => Some(id),
            _ => None,
        }
    }

    /// Textual dump of every user class with its members and resolved types
    pub fn dump_symbols(&self) -> String {
        let mut out = String::new();
        for id in self.symbols.classes() {
            let symbol = self.symbols.symbol(id);
            let Some(class) = symbol.as_class() else {
                continue;
            };
            if class.from_stdlib {
                continue;
            }

            let _ = write!(out, "{} {} [{:?}]", symbol.kind_name(), class.qualified_name(&symbol.name), class.state);
            if let Some(superclass) = class.superclass {
                let _ = write!(out, " extends {}", self.symbols.symbol(superclass).name);
            }
            if !class.interfaces.is_empty() {
                let names: Vec<_> = class.interfaces.iter().map(|i| self.symbols.symbol(*i).name.as_str()).collect();
                let _ = write!(out, " : {}", names.join(", "));
            }
            out.push('\n');

            for member_id in class.fields.iter().chain(&class.methods) {
                let member = self.symbols.symbol(*member_id);
                let ty = match &member.kind {
                    SymbolKind::Variable(v) => self.symbols.display_type(&v.ty),
                    SymbolKind::Method(_) => self
                        .symbols
                        .method_type(*member_id)
                        .map(|t| self.symbols.display_type(&t))
                        .unwrap_or_default(),
                    SymbolKind::Class(_) => continue,
                };
                let _ = writeln!(out, "  {:?} {} {}: {}", member.visibility, member.kind_name(), member.name, ty);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_explicit_import_replaces_wildcard_silently() {
        let (wild, explicit) = (SymbolId(1), SymbolId(2));

        let mut table = ImportTable::default();
        table.insert_wildcard("Console", wild);
        assert_eq!(table.insert_explicit("Console", explicit), None);
        assert_eq!(table.get("Console"), Some(explicit));

        let mut table = ImportTable::default();
        assert_eq!(table.insert_explicit("Console", explicit), None);
        table.insert_wildcard("Console", wild);
        assert_eq!(table.get("Console"), Some(explicit));
        assert_eq!(table.insert_explicit("Console", explicit), Some(explicit));
    }
}
