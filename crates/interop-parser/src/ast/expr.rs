//! Constant expression AST nodes.

use interop_core::{BinaryOp, Span, UnaryOp};

use super::types::{Ident, TypeExpr};

/// An integral constant expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Int { value: i128, span: Span },
    Bool { value: bool, span: Span },
    /// A non-type template parameter, or an error in any other position.
    Name(Ident<'ast>),
    Unary { op: UnaryOp, operand: &'ast Expr<'ast>, span: Span },
    Binary { op: BinaryOp, lhs: &'ast Expr<'ast>, rhs: &'ast Expr<'ast>, span: Span },
    SizeOf { ty: &'ast TypeExpr<'ast>, span: Span },
    AlignOf { ty: &'ast TypeExpr<'ast>, span: Span },
}

impl Expr<'_> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::SizeOf { span, .. }
            | Expr::AlignOf { span, .. } => *span,
            Expr::Name(ident) => ident.span,
        }
    }
}
