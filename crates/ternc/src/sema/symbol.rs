//! Symbols: classes, methods, fields, parameters and locals

use super::scope::ScopeId;
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::Visibility;

/// Index of a symbol in the [`SymbolTable`](super::SymbolTable) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a compilation unit inside a [`Program`](super::Program)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Analysis state of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassState {
    /// Name registered in Global scope
    Declared,
    /// Supertypes and member signatures resolved
    Linked,
    /// Method bodies type-checked
    Checked,
    /// Excluded from further passes after a structural error
    Poisoned,
}

/// A named, typed program entity
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub visibility: Visibility,
    pub span: Span,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone)]
pub enum SymbolKind {
    Class(ClassSymbol),
    Method(MethodSymbol),
    Variable(VariableSymbol),
}

#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub package: String,
    pub is_interface: bool,
    pub superclass: Option<SymbolId>,
    /// Implemented interfaces; for interfaces, the extended ones
    pub interfaces: Vec<SymbolId>,
    /// Member scope holding fields and methods
    pub members: ScopeId,
    /// Every declared method in source order, including name duplicates that
    /// never made it into the member scope
    pub methods: Vec<SymbolId>,
    pub fields: Vec<SymbolId>,
    pub unit: UnitId,
    /// Index of the declaration inside its unit's syntax tree
    pub decl_index: usize,
    pub state: ClassState,
    pub from_stdlib: bool,
}

impl ClassSymbol {
    /// Qualified name such as `std.io.Console`
    pub fn qualified_name(&self, name: &str) -> String {
        if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.package, name)
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.state == ClassState::Poisoned
    }
}

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub params: Vec<SymbolId>,
    pub return_type: Type,
    pub owner: SymbolId,
    pub is_native: bool,
    pub has_body: bool,
    /// Index of the member inside its class declaration
    pub member_index: usize,
    /// Signature failed to resolve; callers get no further diagnostics
    pub poisoned: bool,
}

#[derive(Debug, Clone)]
pub struct VariableSymbol {
    pub ty: Type,
    /// `var` when true, `val` otherwise
    pub mutable: bool,
    pub is_param: bool,
    /// Declaring class for fields, `None` for parameters and locals
    pub owner: Option<SymbolId>,
    /// Declared type failed to resolve (or could not be inferred); uses of
    /// the symbol stay silent instead of cascading
    pub poisoned: bool,
}

impl VariableSymbol {
    pub fn local(ty: Type, mutable: bool) -> Self {
        Self {
            ty,
            mutable,
            is_param: false,
            owner: None,
            poisoned: false,
        }
    }

    pub fn param(ty: Type) -> Self {
        Self {
            ty,
            mutable: false,
            is_param: true,
            owner: None,
            poisoned: false,
        }
    }

    pub fn is_field(&self) -> bool {
        self.owner.is_some()
    }
}

impl Symbol {
    pub fn new(name: impl Into<String>, visibility: Visibility, span: Span, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            visibility,
            span,
            kind,
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn as_class(&self) -> Option<&ClassSymbol> {
        match &self.kind {
            SymbolKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassSymbol> {
        match &mut self.kind {
            SymbolKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodSymbol> {
        match &self.kind {
            SymbolKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableSymbol> {
        match &self.kind {
            SymbolKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Class that declares this member, if it is a field or method
    pub fn owner(&self) -> Option<SymbolId> {
        match &self.kind {
            SymbolKind::Class(_) => None,
            SymbolKind::Method(m) => Some(m.owner),
            SymbolKind::Variable(v) => v.owner,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SymbolKind::Class(c) if c.is_interface => "interface",
            SymbolKind::Class(_) => "class",
            SymbolKind::Method(_) => "method",
            SymbolKind::Variable(v) if v.is_field() => "field",
            SymbolKind::Variable(v) if v.is_param => "parameter",
            SymbolKind::Variable(_) => "variable",
        }
    }
}
