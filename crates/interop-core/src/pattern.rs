//! Template patterns: types and constant expressions that may mention
//! template parameters.
//!
//! Semantic analysis lowers every type expression to a [`PatternType`];
//! instantiation substitutes parameters with canonical arguments to obtain a
//! [`Ty`](crate::Ty). Non-template code uses the same representation with an
//! empty argument list.

use crate::{BinaryOp, BuiltinKind, DeclId, Ty, UnaryOp};

/// A type that may depend on template parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternType {
    /// Type template parameter, by position.
    Param(usize),
    Builtin(BuiltinKind),
    /// A concrete record, including already named template instances.
    Decl(DeclId),
    /// `Template<args...>`; trailing arguments may be omitted when the
    /// template declares defaults for them.
    Specialization {
        template: DeclId,
        args: Vec<PatternArg>,
    },
    Pointer(Box<PatternType>),
    Reference(Box<PatternType>),
    Array(Box<PatternType>, PatternExpr),
    Const(Box<PatternType>),
}

impl PatternType {
    /// Whether substitution needs template arguments.
    pub fn is_dependent(&self) -> bool {
        match self {
            PatternType::Param(_) => true,
            PatternType::Builtin(_) | PatternType::Decl(_) => false,
            PatternType::Specialization { args, .. } => args.iter().any(PatternArg::is_dependent),
            PatternType::Pointer(inner)
            | PatternType::Reference(inner)
            | PatternType::Const(inner) => inner.is_dependent(),
            PatternType::Array(inner, len) => inner.is_dependent() || len.is_dependent(),
        }
    }
}

impl From<&Ty> for PatternType {
    /// Lift a resolved type (an alias target, say) back into a pattern.
    fn from(ty: &Ty) -> Self {
        match ty {
            Ty::Builtin(kind) => PatternType::Builtin(*kind),
            Ty::Record(id) => PatternType::Decl(*id),
            Ty::Pointer(inner) => PatternType::Pointer(Box::new(inner.as_ref().into())),
            Ty::Reference(inner) => PatternType::Reference(Box::new(inner.as_ref().into())),
            Ty::Array(inner, len) => {
                PatternType::Array(Box::new(inner.as_ref().into()), PatternExpr::Int(i128::from(*len)))
            }
            Ty::Const(inner) => PatternType::Const(Box::new(inner.as_ref().into())),
        }
    }
}

/// A template argument inside a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternArg {
    Type(PatternType),
    Value(PatternExpr),
}

impl PatternArg {
    pub fn is_dependent(&self) -> bool {
        match self {
            PatternArg::Type(ty) => ty.is_dependent(),
            PatternArg::Value(expr) => expr.is_dependent(),
        }
    }
}

/// An integral constant expression that may depend on template parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternExpr {
    Int(i128),
    Bool(bool),
    /// Non-type template parameter, by position.
    Param(usize),
    Unary(UnaryOp, Box<PatternExpr>),
    Binary(BinaryOp, Box<PatternExpr>, Box<PatternExpr>),
    SizeOf(Box<PatternType>),
    AlignOf(Box<PatternType>),
}

impl PatternExpr {
    pub fn is_dependent(&self) -> bool {
        match self {
            PatternExpr::Int(_) | PatternExpr::Bool(_) => false,
            PatternExpr::Param(_) => true,
            PatternExpr::Unary(_, operand) => operand.is_dependent(),
            PatternExpr::Binary(_, lhs, rhs) => lhs.is_dependent() || rhs.is_dependent(),
            PatternExpr::SizeOf(ty) | PatternExpr::AlignOf(ty) => ty.is_dependent(),
        }
    }
}
