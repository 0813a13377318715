//! Type model and assignability rules

use super::symbol::SymbolId;
use std::fmt;

/// Built-in primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Float,
    Bool,
    Text,
    Void,
    Null,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Int => "Int",
            PrimitiveType::Float => "Float",
            PrimitiveType::Bool => "Bool",
            PrimitiveType::Text => "Text",
            PrimitiveType::Void => "Void",
            PrimitiveType::Null => "Null",
        };
        f.write_str(name)
    }
}

/// A resolved type. The variant set is closed; every rule below matches it
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveType),
    /// A declared class or interface
    Class(SymbolId),
    Array(Box<Type>),
    Callable { params: Vec<Type>, ret: Box<Type> },
}

/// Answers ancestry questions for class types.
///
/// Keeps the type model independent of the symbol table: the table implements
/// this trait, tests and standalone callers can use [`NoHierarchy`].
pub trait ClassHierarchy {
    /// True if `ancestor` is reachable from `class` through superclass and
    /// interface edges. A class is not its own ancestor.
    fn inherits_from(&self, class: SymbolId, ancestor: SymbolId) -> bool;
}

/// Hierarchy without any edges: class types are assignable only to themselves
pub struct NoHierarchy;

impl ClassHierarchy for NoHierarchy {
    fn inherits_from(&self, _class: SymbolId, _ancestor: SymbolId) -> bool {
        false
    }
}

impl Type {
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    pub const FLOAT: Type = Type::Primitive(PrimitiveType::Float);
    pub const BOOL: Type = Type::Primitive(PrimitiveType::Bool);
    pub const TEXT: Type = Type::Primitive(PrimitiveType::Text);
    pub const VOID: Type = Type::Primitive(PrimitiveType::Void);
    pub const NULL: Type = Type::Primitive(PrimitiveType::Null);

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn callable(params: Vec<Type>, ret: Type) -> Self {
        Type::Callable { params, ret: Box::new(ret) }
    }

    /// Can a value of type `source` be stored into a location of type `self`?
    ///
    /// There is no implicit numeric widening: `Int` is not assignable to
    /// `Float`.
    pub fn is_assignable_from(&self, source: &Type, hierarchy: &dyn ClassHierarchy) -> bool {
        match (self, source) {
            (Type::Primitive(target), Type::Primitive(source)) => target == source,
            (Type::Class(_) | Type::Array(_), Type::Primitive(PrimitiveType::Null)) => true,
            (Type::Class(target), Type::Class(source)) => {
                target == source || hierarchy.inherits_from(*source, *target)
            }
            (
                Type::Callable { params: target_params, ret: target_ret },
                Type::Callable { params: source_params, ret: source_ret },
            ) => {
                target_params.len() == source_params.len()
                    // Parameters are contravariant: the source must accept
                    // everything the target's callers may pass.
                    && target_params
                        .iter()
                        .zip(source_params)
                        .all(|(t, s)| s.is_assignable_from(t, hierarchy))
                    && target_ret.is_assignable_from(source_ret, hierarchy)
            }
            (Type::Array(target), Type::Array(source)) => {
                target.is_assignable_from(source, hierarchy) && source.is_assignable_from(target, hierarchy)
            }
            (Type::Primitive(_), _) | (Type::Class(_), _) | (Type::Array(_), _) | (Type::Callable { .. }, _) => {
                false
            }
        }
    }

    pub fn is_bool(&self) -> bool {
        *self == Type::BOOL
    }

    pub fn is_void(&self) -> bool {
        *self == Type::VOID
    }

    pub fn is_null(&self) -> bool {
        *self == Type::NULL
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::Int | PrimitiveType::Float))
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn class_id(&self) -> Option<SymbolId> {
        match self {
            Type::Class(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: SymbolId = SymbolId(1);
    const B: SymbolId = SymbolId(2);

    /// `B` extends `A`
    struct BExtendsA;

    impl ClassHierarchy for BExtendsA {
        fn inherits_from(&self, class: SymbolId, ancestor: SymbolId) -> bool {
            class == B && ancestor == A
        }
    }

    #[test]
    fn test_primitives_are_strict() {
        assert!(Type::INT.is_assignable_from(&Type::INT, &NoHierarchy));
        assert!(!Type::FLOAT.is_assignable_from(&Type::INT, &NoHierarchy));
        assert!(!Type::INT.is_assignable_from(&Type::FLOAT, &NoHierarchy));
        assert!(!Type::TEXT.is_assignable_from(&Type::NULL, &NoHierarchy));
        assert!(!Type::INT.is_assignable_from(&Type::Class(A), &NoHierarchy));
    }

    #[test]
    fn test_null_into_references_only() {
        assert!(Type::Class(A).is_assignable_from(&Type::NULL, &NoHierarchy));
        assert!(Type::array(Type::INT).is_assignable_from(&Type::NULL, &NoHierarchy));
        assert!(!Type::callable(vec![], Type::VOID).is_assignable_from(&Type::NULL, &NoHierarchy));
        assert!(!Type::BOOL.is_assignable_from(&Type::NULL, &NoHierarchy));
    }

    #[test]
    fn test_class_identity_and_ancestry() {
        assert!(Type::Class(A).is_assignable_from(&Type::Class(A), &NoHierarchy));
        assert!(!Type::Class(A).is_assignable_from(&Type::Class(B), &NoHierarchy));
        assert!(Type::Class(A).is_assignable_from(&Type::Class(B), &BExtendsA));
        assert!(!Type::Class(B).is_assignable_from(&Type::Class(A), &BExtendsA));
    }

    #[test]
    fn test_callable_variance() {
        // (A) -> B  accepts  (A) -> B
        let target = Type::callable(vec![Type::Class(B)], Type::Class(A));
        // a function taking the supertype and returning the subtype fits
        let wider = Type::callable(vec![Type::Class(A)], Type::Class(B));
        assert!(target.is_assignable_from(&wider, &BExtendsA));
        assert!(!wider.is_assignable_from(&target, &BExtendsA));

        let arity = Type::callable(vec![], Type::Class(A));
        assert!(!target.is_assignable_from(&arity, &BExtendsA));
    }

    #[test]
    fn test_arrays_are_invariant() {
        let of_a = Type::array(Type::Class(A));
        let of_b = Type::array(Type::Class(B));
        assert!(of_a.is_assignable_from(&of_a.clone(), &BExtendsA));
        assert!(!of_a.is_assignable_from(&of_b, &BExtendsA));
        assert!(!Type::array(Type::FLOAT).is_assignable_from(&Type::array(Type::INT), &NoHierarchy));
    }
}
