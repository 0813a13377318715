//! Import and name resolution
//!
//! Runs between declaration and body checking. Imports and supertype
//! references are settled by an explicit worklist: every round retries the
//! references still pending, and the loop stops as soon as a round settles
//! nothing new. Whatever is left is reported as one batch.
//!
//! After supertypes are wired, inheritance cycles are found with an iterative
//! Tarjan walk over the `extends`/`implements` graph.

use super::diagnostic::{Diagnostic, Diagnostics, ErrorKind};
use super::program::{CompilationUnit, Program};
use super::scope::SymbolTable;
use super::symbol::{ClassState, SymbolId, UnitId};
use super::types::{PrimitiveType, Type};
use crate::frontend::ast::{PrimitiveName, QualifiedName, TypeExpr, TypeExprKind};
use std::collections::{HashMap, HashSet, VecDeque};

/// Package visible from every file without an import
pub const PRELUDE: &str = "std.lang";

/// Outcome of looking up a class name from one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLookup {
    Found(SymbolId),
    /// Declared, but neither imported nor in the same package or prelude
    NotImported(SymbolId),
    /// Private class of another package
    Private(SymbolId),
    Missing,
}

/// Look up a class or interface name as written in `unit`.
///
/// A qualified name needs no import. A simple name is visible when it is
/// imported, declared in the same package, or part of the prelude.
pub fn lookup_class(symbols: &SymbolTable, unit: &CompilationUnit, name: &QualifiedName) -> ClassLookup {
    if name.is_simple() {
        if let Some(id) = unit.import_table.get(name.name()) {
            return ClassLookup::Found(id);
        }
    }
    let Some(id) = symbols.resolve_local(symbols.global(), name.name()) else {
        return ClassLookup::Missing;
    };
    let Some(class) = symbols.class(id) else {
        return ClassLookup::Missing;
    };
    if !name.is_simple() && class.package != name.qualifier() {
        return ClassLookup::Missing;
    }

    let same_package = class.package == unit.package;
    if !same_package && !symbols.symbol(id).is_public() {
        ClassLookup::Private(id)
    } else if same_package || !name.is_simple() || class.package == PRELUDE {
        ClassLookup::Found(id)
    } else {
        ClassLookup::NotImported(id)
    }
}

/// Diagnostic for a failed [`lookup_class`]
pub fn lookup_error(symbols: &SymbolTable, name: &QualifiedName, lookup: ClassLookup) -> Diagnostic {
    match lookup {
        ClassLookup::Found(_) | ClassLookup::Missing => {
            Diagnostic::error(ErrorKind::UndeclaredType, format!("undeclared type `{}`", name), name.span)
        }
        ClassLookup::NotImported(id) => {
            let package = symbols.class(id).map(|c| c.package.clone()).unwrap_or_default();
            Diagnostic::error(
                ErrorKind::UnresolvedImport,
                format!("type `{}` is declared in package `{}` but not imported", name, package),
                name.span,
            )
            .with_note(format!("add `import {}.{};`", package, name.name()), None)
        }
        ClassLookup::Private(id) => {
            let package = symbols.class(id).map(|c| c.package.clone()).unwrap_or_default();
            Diagnostic::error(
                ErrorKind::VisibilityViolation,
                format!("class `{}` is private to package `{}`", name.name(), package),
                name.span,
            )
            .with_note("declared here", symbols.symbol(id).span)
        }
    }
}

/// Resolve a written type to a semantic type as seen from `unit`
pub fn resolve_type(symbols: &SymbolTable, unit: &CompilationUnit, ty: &TypeExpr) -> Result<Type, Diagnostic> {
    match &ty.kind {
        TypeExprKind::Primitive(name) => Ok(Type::Primitive(match name {
            PrimitiveName::Int => PrimitiveType::Int,
            PrimitiveName::Float => PrimitiveType::Float,
            PrimitiveName::Bool => PrimitiveType::Bool,
            PrimitiveName::Text => PrimitiveType::Text,
            PrimitiveName::Void => PrimitiveType::Void,
        })),
        TypeExprKind::Named(name) => match lookup_class(symbols, unit, name) {
            ClassLookup::Found(id) => Ok(Type::Class(id)),
            other => Err(lookup_error(symbols, name, other)),
        },
        TypeExprKind::Array(element) => Ok(Type::array(resolve_type(symbols, unit, element)?)),
        TypeExprKind::Callable { params, ret } => {
            let params = params
                .iter()
                .map(|p| resolve_type(symbols, unit, p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Type::callable(params, resolve_type(symbols, unit, ret)?))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Extends,
    Implements,
}

/// A cross-file reference waiting for resolution
#[derive(Debug, Clone)]
enum Reference {
    Import { unit: UnitId, index: usize },
    Supertype { class: SymbolId, edge: Edge, name: QualifiedName },
}

enum Attempt {
    Resolved,
    /// Not resolvable yet; the diagnostic is reported if it never settles
    Deferred(Diagnostic),
    /// Resolution is impossible regardless of other references
    Failed(Diagnostic),
}

/// Links imports and supertypes of every unit of a program
pub struct Resolver<'a> {
    program: &'a mut Program,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(program: &'a mut Program, diagnostics: &'a mut Diagnostics) -> Self {
        Self { program, diagnostics }
    }

    /// Settle imports and supertypes, then detect inheritance cycles
    pub fn link(&mut self) {
        let worklist = self.collect_references();
        self.run_fixpoint(worklist);
        self.detect_cycles();
    }

    fn collect_references(&mut self) -> Vec<Reference> {
        let mut imports = Vec::new();
        let mut supertypes = Vec::new();

        for (index, unit) in self.program.units.iter().enumerate() {
            let unit_id = UnitId(index as u32);
            imports.extend((0..unit.imports.len()).map(|index| Reference::Import { unit: unit_id, index }));
        }

        for class in self.program.symbols.classes() {
            let Some(info) = self.program.symbols.class(class) else {
                continue;
            };
            let decl = &self.program.units[info.unit.index()].tree.decls[info.decl_index];

            if decl.is_interface() {
                if let Some(first) = decl.implements.first() {
                    self.diagnostics.error(
                        ErrorKind::InvalidSupertype,
                        format!("interface `{}` cannot implement `{}`; use `extends`", decl.name, first),
                        first.span,
                    );
                    poison(&mut self.program.symbols, class);
                }
                supertypes.extend(decl.extends.iter().map(|name| Reference::Supertype {
                    class,
                    edge: Edge::Implements,
                    name: name.clone(),
                }));
                continue;
            }

            if let Some(extra) = decl.extends.get(1) {
                self.diagnostics.error(
                    ErrorKind::InvalidSupertype,
                    format!("class `{}` can extend only one class", decl.name),
                    extra.span,
                );
                poison(&mut self.program.symbols, class);
            }
            supertypes.extend(decl.extends.first().map(|name| Reference::Supertype {
                class,
                edge: Edge::Extends,
                name: name.clone(),
            }));
            supertypes.extend(decl.implements.iter().map(|name| Reference::Supertype {
                class,
                edge: Edge::Implements,
                name: name.clone(),
            }));
        }

        imports.extend(supertypes);
        imports
    }

    fn run_fixpoint(&mut self, mut pending: Vec<Reference>) {
        let mut round = 0;
        loop {
            round += 1;
            let total = pending.len();
            let mut deferred = Vec::new();

            for reference in pending {
                match self.attempt(&reference) {
                    Attempt::Resolved => {}
                    Attempt::Failed(diagnostic) => self.fail(&reference, diagnostic),
                    Attempt::Deferred(diagnostic) => deferred.push((reference, diagnostic)),
                }
            }

            let settled = total - deferred.len();
            log::debug!("resolution round {}: {} settled, {} pending", round, settled, deferred.len());

            if deferred.is_empty() {
                return;
            }
            if settled == 0 {
                // Fixpoint: nothing left can make progress
                for (reference, diagnostic) in deferred {
                    self.fail(&reference, diagnostic);
                }
                return;
            }
            pending = deferred.into_iter().map(|(reference, _)| reference).collect();
        }
    }

    fn fail(&mut self, reference: &Reference, diagnostic: Diagnostic) {
        if let Reference::Supertype { class, .. } = reference {
            poison(&mut self.program.symbols, *class);
        }
        self.diagnostics.push(diagnostic);
    }

    fn attempt(&mut self, reference: &Reference) -> Attempt {
        match reference {
            Reference::Import { unit, index } => self.attempt_import(*unit, *index),
            Reference::Supertype { class, edge, name } => self.attempt_supertype(*class, *edge, name),
        }
    }

    fn attempt_import(&mut self, unit_id: UnitId, index: usize) -> Attempt {
        let Program { units, symbols, .. } = &mut *self.program;
        let unit = &mut units[unit_id.index()];
        let import = unit.imports[index].clone();
        let prefix = import.path.to_string();

        if import.wildcard {
            let matching: Vec<_> = symbols
                .classes()
                .into_iter()
                .filter(|id| {
                    symbols.class(*id).is_some_and(|c| {
                        let in_package = c.package == prefix || c.package.starts_with(&format!("{}.", prefix));
                        in_package && (c.package == unit.package || symbols.symbol(*id).is_public())
                    })
                })
                .collect();
            if matching.is_empty() {
                return Attempt::Deferred(Diagnostic::error(
                    ErrorKind::UnresolvedImport,
                    format!("no classes found under package `{}`", prefix),
                    import.span,
                ));
            }
            for id in matching {
                unit.import_table.insert_wildcard(symbols.symbol(id).name.clone(), id);
            }
            return Attempt::Resolved;
        }

        let lookup = symbols
            .resolve_local(symbols.global(), import.path.name())
            .filter(|id| symbols.class(*id).is_some_and(|c| c.package == import.path.qualifier()));
        let Some(id) = lookup else {
            return Attempt::Deferred(Diagnostic::error(
                ErrorKind::UnresolvedImport,
                format!("cannot resolve import `{}`", prefix),
                import.span,
            ));
        };

        let symbol = symbols.symbol(id);
        if !symbol.is_public() && import.path.qualifier() != unit.package {
            return Attempt::Failed(
                Diagnostic::error(
                    ErrorKind::VisibilityViolation,
                    format!("class `{}` is private to package `{}`", symbol.name, import.path.qualifier()),
                    import.span,
                )
                .with_note("declared here", symbol.span),
            );
        }

        if unit.import_table.insert_explicit(symbol.name.clone(), id).is_some() {
            self.diagnostics.warning(
                ErrorKind::UnresolvedImport,
                format!("`{}` is imported more than once", symbol.name),
                import.span,
            );
        }
        Attempt::Resolved
    }

    fn attempt_supertype(&mut self, class: SymbolId, edge: Edge, name: &QualifiedName) -> Attempt {
        let symbols = &mut self.program.symbols;
        let Some(info) = symbols.class(class) else {
            return Attempt::Resolved;
        };
        let unit = &self.program.units[info.unit.index()];
        let is_interface = info.is_interface;
        let class_name = symbols.symbol(class).name.clone();

        let target = match lookup_class(symbols, unit, name) {
            ClassLookup::Found(target) => target,
            ClassLookup::Private(target) => {
                return Attempt::Failed(lookup_error(symbols, name, ClassLookup::Private(target)));
            }
            other => return Attempt::Deferred(lookup_error(symbols, name, other)),
        };
        let target_is_interface = symbols.class(target).is_some_and(|c| c.is_interface);

        let invalid = |message: String| Attempt::Failed(Diagnostic::error(ErrorKind::InvalidSupertype, message, name.span));
        let Some(info) = symbols.class_mut(class) else {
            return Attempt::Resolved;
        };
        match (is_interface, edge, target_is_interface) {
            (false, Edge::Extends, false) => info.superclass = Some(target),
            (false, Edge::Implements, true) | (true, _, true) => info.interfaces.push(target),
            (false, Edge::Extends, true) => {
                return invalid(format!("class `{}` cannot extend interface `{}`; use `implements`", class_name, name));
            }
            (false, Edge::Implements, false) => {
                return invalid(format!("class `{}` can only implement interfaces, `{}` is a class", class_name, name));
            }
            (true, _, false) => {
                return invalid(format!("interface `{}` can only extend interfaces, `{}` is a class", class_name, name));
            }
        }
        Attempt::Resolved
    }

    /// Report one `InheritanceCycle` per cyclic component and poison its
    /// members. Classes that merely inherit from a cycle stay untouched.
    fn detect_cycles(&mut self) {
        let symbols = &mut self.program.symbols;
        let classes = symbols.classes();
        let components = strongly_connected(&classes, |id| supertypes(symbols, id));

        for mut component in components {
            let start = component[0];
            let self_edge = supertypes(symbols, start).contains(&start);
            if component.len() == 1 && !self_edge {
                continue;
            }
            component.sort();
            let path = cycle_path(symbols, &component);
            let names: Vec<_> = path.iter().map(|id| symbols.symbol(*id).name.as_str()).collect();
            let diagnostic = Diagnostic::error(
                ErrorKind::InheritanceCycle,
                format!("inheritance cycle: {}", names.join(" -> ")),
                symbols.symbol(component[0]).span,
            );
            log::debug!("{}", diagnostic.message);
            self.diagnostics.push(diagnostic);

            for id in component {
                poison(symbols, id);
            }
        }
    }
}

fn poison(symbols: &mut SymbolTable, class: SymbolId) {
    if let Some(info) = symbols.class_mut(class) {
        info.state = ClassState::Poisoned;
    }
}

fn supertypes(symbols: &SymbolTable, class: SymbolId) -> Vec<SymbolId> {
    symbols
        .class(class)
        .map(|c| c.superclass.iter().chain(&c.interfaces).copied().collect())
        .unwrap_or_default()
}

/// Shortest cycle through the smallest member of a sorted component, found
/// by a breadth-first walk over supertype edges that stay inside it
fn cycle_path(symbols: &SymbolTable, component: &[SymbolId]) -> Vec<SymbolId> {
    let start = component[0];
    let mut parent: HashMap<SymbolId, SymbolId> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in supertypes(symbols, current) {
            if next == start {
                let mut path = vec![current];
                let mut node = current;
                while let Some(&up) = parent.get(&node) {
                    path.push(up);
                    node = up;
                }
                path.reverse();
                path.push(start);
                return path;
            }
            if component.contains(&next) && !parent.contains_key(&next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    vec![start, start]
}

/// Iterative Tarjan: strongly connected components of the graph spanned by
/// `nodes` and `successors`, in reverse topological order
fn strongly_connected<F>(nodes: &[SymbolId], successors: F) -> Vec<Vec<SymbolId>>
where
    F: Fn(SymbolId) -> Vec<SymbolId>,
{
    let mut index: HashMap<SymbolId, usize> = HashMap::new();
    let mut low: HashMap<SymbolId, usize> = HashMap::new();
    let mut on_stack: HashSet<SymbolId> = HashSet::new();
    let mut stack = Vec::new();
    let mut components = Vec::new();
    let mut counter = 0;

    for &root in nodes {
        if index.contains_key(&root) {
            continue;
        }
        // (node, next successor to visit)
        let mut work = vec![(root, 0usize)];
        while let Some((node, edge)) = work.pop() {
            if edge == 0 {
                index.insert(node, counter);
                low.insert(node, counter);
                counter += 1;
                stack.push(node);
                on_stack.insert(node);
            }

            let next = successors(node);
            if let Some(&succ) = next.get(edge) {
                work.push((node, edge + 1));
                if !index.contains_key(&succ) {
                    work.push((succ, 0));
                } else if on_stack.contains(&succ) {
                    let lowest = low[&node].min(index[&succ]);
                    low.insert(node, lowest);
                }
                continue;
            }

            if low[&node] == index[&node] {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack.remove(&member);
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                components.push(component);
            }
            if let Some(&(parent, _)) = work.last() {
                let lowest = low[&parent].min(low[&node]);
                low.insert(parent, lowest);
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sorted(mut components: Vec<Vec<SymbolId>>) -> Vec<Vec<SymbolId>> {
        for component in &mut components {
            component.sort();
        }
        components.sort();
        components
    }

    #[test]
    fn test_scc_finds_two_cycle() {
        let (a, b, c) = (SymbolId(0), SymbolId(1), SymbolId(2));
        let edges = HashMap::from([(a, vec![b]), (b, vec![a]), (c, vec![a])]);
        let components = strongly_connected(&[a, b, c], |id| edges.get(&id).cloned().unwrap_or_default());

        assert_eq!(sorted(components), vec![vec![a, b], vec![c]]);
    }

    #[test]
    fn test_scc_on_long_chain() {
        let nodes: Vec<_> = (0..10_000).map(SymbolId).collect();
        let last = nodes.len() as u32 - 1;
        // 0 -> 1 -> ... -> last -> 0
        let components = strongly_connected(&nodes, |id| vec![SymbolId(if id.0 == last { 0 } else { id.0 + 1 })]);

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), nodes.len());
    }

    #[test]
    fn test_scc_self_loop_is_single_component() {
        let a = SymbolId(0);
        let components = strongly_connected(&[a], |_| vec![a]);
        assert_eq!(components, vec![vec![a]]);
    }
}
