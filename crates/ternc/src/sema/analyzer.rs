//! Semantic analyzer - pass orchestration
//!
//! Pass 1 registers every class and interface name in Global scope. The
//! resolver then links imports and supertypes and finds inheritance cycles.
//! Pass 2 resolves member signatures and checks interface conformance.
//! Pass 3 checks bodies of every class that is not poisoned.

use super::body::BodyChecker;
use super::diagnostic::{Diagnostic, Diagnostics, ErrorKind};
use super::program::{CompilationUnit, Program, UnitState};
use super::resolver::{resolve_type, Resolver};
use super::scope::{ScopeKind, SymbolTable};
use super::symbol::{
    ClassState, ClassSymbol, MethodSymbol, Symbol, SymbolId, SymbolKind, UnitId, VariableSymbol,
};
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::{FieldDecl, Member, MemberKind, MethodDecl, TypeDecl};
use std::collections::HashSet;

/// Analyzer options
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    /// Report a program without an `entry` method as an error. Off for
    /// libraries.
    pub require_entry_point: bool,
}

/// Multi-pass semantic analyzer
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyze `units` against the pre-loaded `stdlib` units.
    ///
    /// On failure the complete diagnostic batch is returned, errors first,
    /// each group ordered by source offset.
    pub fn analyze(&self, units: Vec<CompilationUnit>, stdlib: Vec<CompilationUnit>) -> Result<Program, Vec<Diagnostic>> {
        let (mut program, diagnostics) = self.run(units, stdlib);
        let (mut errors, warnings) = diagnostics.partition();
        if errors.is_empty() {
            program.warnings = warnings;
            Ok(program)
        } else {
            errors.extend(warnings);
            Err(errors)
        }
    }

    /// Run every pass and hand back the program together with all
    /// diagnostics, whether or not analysis succeeded
    pub fn run(&self, units: Vec<CompilationUnit>, stdlib: Vec<CompilationUnit>) -> (Program, Diagnostics) {
        let mut program = Program::new(stdlib, units);
        let mut diagnostics = Diagnostics::new();

        log::debug!("pass 1: declaring classes of {} unit(s)", program.units.len());
        declare_classes(&mut program, &mut diagnostics);

        log::debug!("linking imports and supertypes");
        Resolver::new(&mut program, &mut diagnostics).link();

        log::debug!("pass 2: resolving member signatures");
        declare_members(&mut program, &mut diagnostics);
        check_conformance(&program.symbols, &mut diagnostics);
        mark_linked(&mut program);

        log::debug!("pass 3: checking bodies");
        check_bodies(&mut program, &mut diagnostics);

        self.validate_entry_point(&program, &mut diagnostics);
        log::debug!(
            "analysis finished: {} error(s), {} diagnostic(s) total",
            diagnostics.error_count(),
            diagnostics.len()
        );
        (program, diagnostics)
    }

    fn validate_entry_point(&self, program: &Program, diagnostics: &mut Diagnostics) {
        let symbols = &program.symbols;
        let entries: Vec<_> = symbols
            .classes()
            .into_iter()
            .filter(|id| symbols.class(*id).is_some_and(|c| !c.from_stdlib) && symbols.is_entry_point(*id))
            .collect();

        match entries.as_slice() {
            [] if self.config.require_entry_point => diagnostics.error(
                ErrorKind::MissingOrDuplicateEntryPoint,
                "no entry point: declare `entry(args: [Text]): Void` in exactly one class",
                None,
            ),
            [] | [_] => {}
            [first, rest @ ..] => {
                for duplicate in rest {
                    let symbol = symbols.symbol(*duplicate);
                    let diagnostic = Diagnostic::error(
                        ErrorKind::MissingOrDuplicateEntryPoint,
                        format!("class `{}` declares a second entry point", symbol.name),
                        symbol.span,
                    )
                    .with_note(
                        format!("`{}` already declares one", symbols.symbol(*first).name),
                        symbols.symbol(*first).span,
                    );
                    diagnostics.push(diagnostic);
                }
            }
        }
    }
}

/// Analyze with library semantics: no entry point required
pub fn analyze(units: Vec<CompilationUnit>, stdlib: Vec<CompilationUnit>) -> Result<Program, Vec<Diagnostic>> {
    Analyzer::new(AnalyzerConfig::default()).analyze(units, stdlib)
}

// ==================== Pass 1 ====================

fn declare_classes(program: &mut Program, diagnostics: &mut Diagnostics) {
    let Program { units, symbols, .. } = program;
    let global = symbols.global();

    for (index, unit) in units.iter_mut().enumerate() {
        let unit_id = UnitId(index as u32);
        let file_scope = symbols.push_scope(ScopeKind::File(unit_id), global);
        unit.scope = Some(file_scope);

        for (decl_index, decl) in unit.tree.decls.iter().enumerate() {
            let class = ClassSymbol {
                package: unit.package.clone(),
                is_interface: decl.is_interface(),
                superclass: None,
                interfaces: Vec::new(),
                // Replaced by the class's own scope right below
                members: file_scope,
                methods: Vec::new(),
                fields: Vec::new(),
                unit: unit_id,
                decl_index,
                state: ClassState::Declared,
                from_stdlib: unit.is_stdlib,
            };
            let symbol = Symbol::new(&decl.name, decl.visibility, decl.span, SymbolKind::Class(class));

            match symbols.define(global, symbol) {
                Ok(id) => {
                    let members = symbols.push_scope(ScopeKind::Class(id), file_scope);
                    if let Some(class) = symbols.class_mut(id) {
                        class.members = members;
                    }
                    log::trace!("declared {} `{}`", if decl.is_interface() { "interface" } else { "class" }, decl.name);
                }
                Err(dup) => {
                    let existing = symbols.symbol(dup.existing);
                    let mut diagnostic = Diagnostic::error(
                        ErrorKind::DuplicateClass,
                        format!("class `{}` is already declared", decl.name),
                        decl.span,
                    )
                    .with_note("first declared here", existing.span);
                    if let Some(library) = existing.as_class().filter(|c| c.from_stdlib && !unit.is_stdlib) {
                        diagnostic = diagnostic.with_note(
                            format!(
                                "the name `{}` is reserved by the standard library class `{}`",
                                decl.name,
                                library.qualified_name(&existing.name)
                            ),
                            None,
                        );
                    }
                    diagnostics.push(diagnostic);
                }
            }
        }
        unit.state = UnitState::Declared;
    }
}

// ==================== Pass 2 ====================

fn declare_members(program: &mut Program, diagnostics: &mut Diagnostics) {
    let Program { units, symbols, .. } = program;

    for class in symbols.classes() {
        let Some(info) = symbols.class(class) else {
            continue;
        };
        let unit = &units[info.unit.index()];
        let decl = &unit.tree.decls[info.decl_index];

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        for (index, member) in decl.members.iter().enumerate() {
            match &member.kind {
                MemberKind::Field(field) => {
                    if let Some(id) = declare_field(symbols, unit, diagnostics, class, member, field) {
                        fields.push(id);
                    }
                }
                MemberKind::Method(method) => {
                    methods.push(declare_method(symbols, unit, diagnostics, class, decl, member, method, index));
                }
            }
        }

        if let Some(info) = symbols.class_mut(class) {
            info.fields = fields;
            info.methods = methods;
        }
    }
}

fn declare_field(
    symbols: &mut SymbolTable,
    unit: &CompilationUnit,
    diagnostics: &mut Diagnostics,
    class: SymbolId,
    member: &Member,
    field: &FieldDecl,
) -> Option<SymbolId> {
    let (ty, poisoned) = match resolve_type(symbols, unit, &field.ty) {
        Ok(ty) if ty.is_void() => {
            diagnostics.error(
                ErrorKind::TypeMismatch,
                format!("field `{}` cannot have type Void", field.name),
                field.ty.span,
            );
            (ty, true)
        }
        Ok(ty) => (ty, false),
        Err(diagnostic) => {
            diagnostics.push(diagnostic);
            (Type::VOID, true)
        }
    };

    let variable = VariableSymbol {
        ty,
        mutable: field.mutable,
        is_param: false,
        owner: Some(class),
        poisoned,
    };
    let symbol = Symbol::new(&field.name, member.visibility, field.span, SymbolKind::Variable(variable));
    let members = symbols.class(class)?.members;
    match symbols.define(members, symbol) {
        Ok(id) => Some(id),
        Err(dup) => {
            diagnostics.push(duplicate_member(symbols, class, &field.name, field.span, dup.existing));
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn declare_method(
    symbols: &mut SymbolTable,
    unit: &CompilationUnit,
    diagnostics: &mut Diagnostics,
    class: SymbolId,
    decl: &TypeDecl,
    member: &Member,
    method: &MethodDecl,
    member_index: usize,
) -> SymbolId {
    let mut poisoned = false;
    let mut params = Vec::new();
    for param in &method.params {
        let ty = match resolve_type(symbols, unit, &param.ty) {
            Ok(ty) if ty.is_void() => {
                diagnostics.error(
                    ErrorKind::TypeMismatch,
                    format!("parameter `{}` cannot have type Void", param.name),
                    param.ty.span,
                );
                poisoned = true;
                ty
            }
            Ok(ty) => ty,
            Err(diagnostic) => {
                diagnostics.push(diagnostic);
                poisoned = true;
                Type::VOID
            }
        };
        let symbol = Symbol::new(
            &param.name,
            member.visibility,
            param.span,
            SymbolKind::Variable(VariableSymbol::param(ty)),
        );
        params.push(symbols.alloc(symbol));
    }

    let return_type = match method.return_type.as_ref().map(|ty| resolve_type(symbols, unit, ty)) {
        Some(Ok(ty)) => ty,
        Some(Err(diagnostic)) => {
            diagnostics.push(diagnostic);
            poisoned = true;
            Type::VOID
        }
        None => Type::VOID,
    };

    let symbol = Symbol::new(
        &method.name,
        member.visibility,
        method.span,
        SymbolKind::Method(MethodSymbol {
            params,
            return_type,
            owner: class,
            is_native: method.is_native,
            has_body: method.body.is_some(),
            member_index,
            poisoned,
        }),
    );
    let id = symbols.alloc(symbol);

    let Some(members) = symbols.class(class).map(|c| c.members) else {
        return id;
    };
    if let Err(dup) = symbols.bind(members, id) {
        if symbols.symbol(dup.existing).as_method().is_some() {
            // Methods sharing a name are accepted without overload
            // resolution; calls bind to the first declaration.
            log::trace!("`{}.{}` declared more than once, keeping the first", decl.name, method.name);
        } else {
            diagnostics.push(duplicate_member(symbols, class, &method.name, method.span, dup.existing));
        }
    }
    id
}

fn duplicate_member(symbols: &SymbolTable, class: SymbolId, name: &str, span: Span, existing: SymbolId) -> Diagnostic {
    Diagnostic::error(
        ErrorKind::DuplicateSymbolInScope,
        format!("`{}` is already declared in `{}`", name, symbols.symbol(class).name),
        span,
    )
    .with_note("first declared here", symbols.symbol(existing).span)
}

/// Every concrete class must provide the methods of all interfaces it
/// implements, directly or through its superclass chain
fn check_conformance(symbols: &SymbolTable, diagnostics: &mut Diagnostics) {
    for class in symbols.classes() {
        let Some(info) = symbols.class(class) else {
            continue;
        };
        if info.is_interface || info.is_poisoned() {
            continue;
        }

        let interfaces = symbols
            .ancestors(class)
            .into_iter()
            .filter(|id| symbols.class(*id).is_some_and(|c| c.is_interface));
        for interface in interfaces {
            let Some(required) = symbols.class(interface).map(|c| c.methods.clone()) else {
                continue;
            };
            for method in required {
                let Some(expected) = symbols.method_type(method) else {
                    continue;
                };
                if symbols.symbol(method).as_method().is_some_and(|m| m.poisoned) {
                    continue;
                }
                let name = &symbols.symbol(method).name;
                if provides(symbols, class, name, &expected) {
                    continue;
                }
                let diagnostic = Diagnostic::error(
                    ErrorKind::MissingInterfaceMethod,
                    format!(
                        "class `{}` does not implement `{}.{}` of type {}",
                        symbols.symbol(class).name,
                        symbols.symbol(interface).name,
                        name,
                        symbols.display_type(&expected)
                    ),
                    symbols.symbol(class).span,
                )
                .with_note("required by this declaration", symbols.symbol(method).span);
                diagnostics.push(diagnostic);
            }
        }
    }
}

/// Does `class` or one of its superclasses declare a method `name` usable
/// where `expected` is required?
fn provides(symbols: &SymbolTable, class: SymbolId, name: &str, expected: &Type) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(class);
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        let Some(info) = symbols.class(id) else {
            break;
        };
        let found = info.methods.iter().any(|m| {
            let symbol = symbols.symbol(*m);
            symbol.name == name
                && match symbol.as_method() {
                    Some(method) if method.poisoned => true,
                    Some(_) => symbols
                        .method_type(*m)
                        .is_some_and(|actual| symbols.is_assignable(expected, &actual)),
                    None => false,
                }
        });
        if found {
            return true;
        }
        current = info.superclass;
    }
    false
}

fn mark_linked(program: &mut Program) {
    for class in program.symbols.classes() {
        if let Some(info) = program.symbols.class_mut(class) {
            if info.state == ClassState::Declared {
                info.state = ClassState::Linked;
            }
        }
    }
    for unit in &mut program.units {
        unit.state = UnitState::Linked;
    }
}

// ==================== Pass 3 ====================

fn check_bodies(program: &mut Program, diagnostics: &mut Diagnostics) {
    let classes = program.symbols.classes();

    for index in 0..program.units.len() {
        if program.units[index].is_stdlib {
            continue;
        }
        let unit_id = UnitId(index as u32);
        // Bodies are annotated in place; the unit itself stays readable for
        // name lookups while its declarations are out.
        let mut decls = std::mem::take(&mut program.units[index].tree.decls);
        let Program { units, symbols, .. } = &mut *program;
        let unit = &units[index];

        for &class in &classes {
            let Some(info) = symbols.class(class) else {
                continue;
            };
            if info.unit != unit_id {
                continue;
            }
            if info.state != ClassState::Linked {
                log::debug!("skipping bodies of poisoned class `{}`", symbols.symbol(class).name);
                continue;
            }
            let (decl_index, members) = (info.decl_index, info.members);

            BodyChecker::new(symbols, unit, diagnostics, class, members).check_class(&mut decls[decl_index]);
            if let Some(info) = symbols.class_mut(class) {
                info.state = ClassState::Checked;
            }
        }

        program.units[index].tree.decls = decls;
        program.units[index].state = UnitState::Checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use pretty_assertions::assert_eq;

    fn unit(path: &str, source: &str) -> CompilationUnit {
        CompilationUnit::new(path, Parser::new(source).parse_file().unwrap())
    }

    fn kinds(result: Result<Program, Vec<Diagnostic>>) -> Vec<ErrorKind> {
        match result {
            Ok(_) => Vec::new(),
            Err(diagnostics) => diagnostics.iter().map(|d| d.kind).collect(),
        }
    }

    #[test]
    fn test_duplicate_class_points_at_second_declaration() {
        let source = "class A {} class A {}";
        let diagnostics = analyze(vec![unit("a.tn", source)], Vec::new()).err().unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::DuplicateClass);
        assert_eq!(diagnostics[0].offset(), Some(11));
    }

    #[test]
    fn test_states_after_success() {
        let program = analyze(vec![unit("a.tn", "class A {} interface I {}")], Vec::new()).unwrap();

        assert_eq!(program.class_state("A"), Some(ClassState::Checked));
        assert_eq!(program.class_state("I"), Some(ClassState::Checked));
        assert!(program.units.iter().all(|u| u.state == UnitState::Checked));
    }

    #[test]
    fn test_entry_point_required_by_config() {
        let analyzer = Analyzer::new(AnalyzerConfig { require_entry_point: true });
        let result = analyzer.analyze(vec![unit("a.tn", "class A {}")], Vec::new());
        assert_eq!(kinds(result), vec![ErrorKind::MissingOrDuplicateEntryPoint]);

        let source = "class Main { entry(args: [Text]): Void { } }";
        let program = analyzer.analyze(vec![unit("main.tn", source)], Vec::new()).unwrap();
        assert_eq!(program.entry_point(), program.find_class("Main"));
    }

    #[test]
    fn test_duplicate_entry_points() {
        let source = "
            class A { entry(args: [Text]): Void { } }
            class B { entry(args: [Text]): Void { } }
        ";
        assert_eq!(
            kinds(analyze(vec![unit("a.tn", source)], Vec::new())),
            vec![ErrorKind::MissingOrDuplicateEntryPoint]
        );
    }

    #[test]
    fn test_overloaded_names_are_permitted() {
        let source = "class A { f(): Int { return 1; } f(x: Int): Int { return x; } g(): Int { return f(); } }";
        let program = analyze(vec![unit("a.tn", source)], Vec::new()).unwrap();
        let class = program.find_class("A").unwrap();
        assert_eq!(program.symbols.class(class).unwrap().methods.len(), 2);
    }

    #[test]
    fn test_field_and_method_clash() {
        let source = "class A { var f: Int; f(): Int { return 1; } }";
        assert_eq!(
            kinds(analyze(vec![unit("a.tn", source)], Vec::new())),
            vec![ErrorKind::DuplicateSymbolInScope]
        );
    }
}
