//! Scope arena and symbol table
//!
//! Every scope and symbol of a program lives in one [`SymbolTable`]. Scopes
//! point at their parent by index, so the chain
//! `Block -> Method -> Class -> File -> Global` never forms an ownership
//! cycle. Names are interned; a scope maps interned names to symbol ids.

use super::symbol::{ClassSymbol, Symbol, SymbolId, UnitId};
use super::types::{ClassHierarchy, PrimitiveType, Type};
use std::collections::{HashMap, HashSet, VecDeque};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Index of a scope in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Root; holds every top-level class and interface
    Global,
    /// One per compilation unit; holds nothing itself
    File(UnitId),
    /// Fields and methods of a class
    Class(SymbolId),
    /// Parameters and top-level locals of a method
    Method(SymbolId),
    /// Nested block (`if`, `while`, `for`, bare `{}`)
    Block,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    names: HashMap<DefaultSymbol, SymbolId>,
}

/// A name is already defined in the target scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateSymbol {
    pub existing: SymbolId,
}

/// Arena owning all scopes and symbols of one program
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    interner: DefaultStringInterner,
}

impl SymbolTable {
    pub fn new() -> Self {
        let global = Scope {
            kind: ScopeKind::Global,
            parent: None,
            names: HashMap::new(),
        };
        Self {
            scopes: vec![global],
            symbols: Vec::new(),
            interner: DefaultStringInterner::default(),
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a scope chained to `parent`
    pub fn push_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent: Some(parent),
            names: HashMap::new(),
        });
        id
    }

    /// Store a symbol without binding its name anywhere
    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Define a new symbol in `scope`. Fails only if the same name already
    /// exists in this very scope; outer scopes may be shadowed.
    pub fn define(&mut self, scope: ScopeId, symbol: Symbol) -> Result<SymbolId, DuplicateSymbol> {
        if let Some(existing) = self.resolve_local(scope, &symbol.name) {
            return Err(DuplicateSymbol { existing });
        }
        let name = self.interner.get_or_intern(&symbol.name);
        let id = self.alloc(symbol);
        self.scopes[scope.index()].names.insert(name, id);
        Ok(id)
    }

    /// Bind an already allocated symbol under its own name in `scope`
    pub fn bind(&mut self, scope: ScopeId, id: SymbolId) -> Result<(), DuplicateSymbol> {
        let name = self.interner.get_or_intern(&self.symbols[id.index()].name);
        let names = &mut self.scopes[scope.index()].names;
        if let Some(existing) = names.get(&name) {
            return Err(DuplicateSymbol { existing: *existing });
        }
        names.insert(name, id);
        Ok(())
    }

    /// Look `name` up in `scope` only
    pub fn resolve_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let key = self.interner.get(name)?;
        self.scopes[scope.index()].names.get(&key).copied()
    }

    /// Look `name` up in `scope` and then outward; the innermost hit wins
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        // A name never interned is defined nowhere
        let key = self.interner.get(name)?;
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(symbol) = scope.names.get(&key) {
                return Some(*symbol);
            }
            current = scope.parent;
        }
        None
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn class(&self, id: SymbolId) -> Option<&ClassSymbol> {
        self.symbols.get(id.index()).and_then(Symbol::as_class)
    }

    pub fn class_mut(&mut self, id: SymbolId) -> Option<&mut ClassSymbol> {
        self.symbols.get_mut(id.index()).and_then(Symbol::as_class_mut)
    }

    /// All class and interface symbols registered in Global scope
    pub fn classes(&self) -> Vec<SymbolId> {
        let mut classes: Vec<_> = self.scopes[0].names.values().copied().collect();
        classes.sort();
        classes
    }

    /// Supertypes of `class`, nearest first: superclass chain, then
    /// interfaces. Safe on cyclic hierarchies; `class` itself is excluded.
    pub fn ancestors(&self, class: SymbolId) -> Vec<SymbolId> {
        let mut seen = HashSet::from([class]);
        let mut order = Vec::new();
        let mut queue = VecDeque::from([class]);

        while let Some(current) = queue.pop_front() {
            let Some(info) = self.class(current) else {
                continue;
            };
            for next in info.superclass.iter().chain(&info.interfaces) {
                if seen.insert(*next) {
                    order.push(*next);
                    queue.push_back(*next);
                }
            }
        }
        order
    }

    /// Find a member by name: the class's own member scope first, then its
    /// ancestors. Member lookup never walks the lexical chain.
    pub fn lookup_member(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        std::iter::once(class)
            .chain(self.ancestors(class))
            .filter_map(|c| self.class(c))
            .find_map(|c| self.resolve_local(c.members, name))
    }

    /// Private members are reachable only from bodies of their own class
    pub fn is_accessible(&self, member: SymbolId, from_class: Option<SymbolId>) -> bool {
        let symbol = self.symbol(member);
        symbol.is_public() || (symbol.owner().is_some() && symbol.owner() == from_class)
    }

    /// `entry(args: [Text]): Void` declared directly in `class`
    pub fn is_entry_point(&self, class: SymbolId) -> bool {
        let Some(info) = self.class(class) else {
            return false;
        };
        let entry_signature = Type::callable(vec![Type::array(Type::TEXT)], Type::VOID);
        info.methods.iter().any(|m| {
            self.symbol(*m).name == "entry" && self.method_type(*m).as_ref() == Some(&entry_signature)
        })
    }

    /// Callable type of a method symbol
    pub fn method_type(&self, method: SymbolId) -> Option<Type> {
        let info = self.symbol(method).as_method()?;
        let params = info
            .params
            .iter()
            .map(|p| self.symbol(*p).as_variable().map(|v| v.ty.clone()))
            .collect::<Option<Vec<_>>>()?;
        Some(Type::callable(params, info.return_type.clone()))
    }

    /// Human readable rendering of a type, using declared class names
    pub fn display_type(&self, ty: &Type) -> String {
        match ty {
            Type::Primitive(PrimitiveType::Null) => "null".to_string(),
            Type::Primitive(p) => p.to_string(),
            Type::Class(id) => self.symbol(*id).name.clone(),
            Type::Array(element) => format!("[{}]", self.display_type(element)),
            Type::Callable { params, ret } => {
                let params: Vec<_> = params.iter().map(|p| self.display_type(p)).collect();
                format!("({}) -> {}", params.join(", "), self.display_type(ret))
            }
        }
    }

    pub fn is_assignable(&self, target: &Type, source: &Type) -> bool {
        target.is_assignable_from(source, self)
    }
}

impl ClassHierarchy for SymbolTable {
    fn inherits_from(&self, class: SymbolId, ancestor: SymbolId) -> bool {
        self.ancestors(class).contains(&ancestor)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::frontend::ast::Visibility;
    use crate::sema::symbol::{ClassState, SymbolKind, VariableSymbol};

    fn local(name: &str, ty: Type) -> Symbol {
        Symbol::new(
            name,
            Visibility::Public,
            Span::default(),
            SymbolKind::Variable(VariableSymbol::local(ty, true)),
        )
    }

    fn class(table: &mut SymbolTable, name: &str, superclass: Option<SymbolId>) -> SymbolId {
        let global = table.global();
        let members = table.push_scope(ScopeKind::Block, global);
        let symbol = Symbol::new(
            name,
            Visibility::Public,
            Span::default(),
            SymbolKind::Class(ClassSymbol {
                package: String::new(),
                is_interface: false,
                superclass,
                interfaces: Vec::new(),
                members,
                methods: Vec::new(),
                fields: Vec::new(),
                unit: UnitId(0),
                decl_index: 0,
                state: ClassState::Declared,
                from_stdlib: false,
            }),
        );
        table.define(global, symbol).unwrap()
    }

    #[test]
    fn test_define_rejects_duplicates_in_same_scope() {
        let mut table = SymbolTable::new();
        let global = table.global();
        let block = table.push_scope(ScopeKind::Block, global);

        let first = table.define(block, local("x", Type::INT)).unwrap();
        let err = table.define(block, local("x", Type::INT)).unwrap_err();
        assert_eq!(err, DuplicateSymbol { existing: first });
    }

    #[test]
    fn test_shadowing_across_scopes() {
        let mut table = SymbolTable::new();
        let global = table.global();
        let outer = table.push_scope(ScopeKind::Block, global);
        let inner = table.push_scope(ScopeKind::Block, outer);

        let outer_x = table.define(outer, local("x", Type::INT)).unwrap();
        let inner_x = table.define(inner, local("x", Type::TEXT)).unwrap();

        assert_eq!(table.resolve(inner, "x"), Some(inner_x));
        assert_eq!(table.resolve(outer, "x"), Some(outer_x));
        assert_eq!(table.resolve(inner, "y"), None);
        assert_eq!(table.resolve_local(inner, "x"), Some(inner_x));
    }

    #[test]
    fn test_ancestors_tolerate_cycles() {
        let mut table = SymbolTable::new();
        let a = class(&mut table, "A", None);
        let b = class(&mut table, "B", Some(a));
        table.class_mut(a).unwrap().superclass = Some(b);

        assert_eq!(table.ancestors(a), vec![b]);
        assert_eq!(table.ancestors(b), vec![a]);
        assert!(table.inherits_from(b, a));
    }

    #[test]
    fn test_member_lookup_walks_superclasses() {
        let mut table = SymbolTable::new();
        let base = class(&mut table, "Base", None);
        let derived = class(&mut table, "Derived", Some(base));
        let base_members = table.class(base).unwrap().members;
        let field = table.define(base_members, local("count", Type::INT)).unwrap();

        assert_eq!(table.lookup_member(derived, "count"), Some(field));
        assert_eq!(table.lookup_member(derived, "missing"), None);
        assert_eq!(table.display_type(&Type::array(Type::Class(derived))), "[Derived]");
    }
}
