//! Type parsing.
//!
//! Implements parsing of type expressions:
//! - Builtin specifier sequences (`unsigned long long`, `signed char`)
//! - Qualified names (`ns::Foo`, `::Foo`) and template-ids (`Foo<int, 4>`)
//! - cv-qualifiers in either position (`const int`, `int const`)
//! - Pointer, reference and array declarators
//! - Template argument lists, including the type/expression disambiguation

use interop_core::{BuiltinKind, ParseError, ParseErrorKind, ensure_sufficient_stack};

use crate::lexer::TokenKind;

use super::parser::Parser;
use super::types::{Ident, PathExpr, TemplateArgExpr, TypeExpr};

impl<'ast> Parser<'ast> {
    /// Parse a complete abstract type: specifiers, pointer/reference
    /// operators and array bounds, without a declarator name.
    pub fn parse_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let base = self.parse_decl_specifiers()?;
        let ty = self.parse_ptr_operators(base);
        self.parse_array_suffixes(ty)
    }

    /// Whether the current token can begin a type.
    pub(super) fn starts_type(&self) -> bool {
        let kind = self.peek().kind;
        kind.is_builtin_type_word()
            || kind.is_record_key()
            || matches!(
                kind,
                TokenKind::Const
                    | TokenKind::Volatile
                    | TokenKind::Typename
                    | TokenKind::Identifier
                    | TokenKind::ColonColon
            )
    }

    /// Parse the type-specifier part of a declaration, with cv-qualifiers on
    /// either side: `const unsigned int`, `Foo<T> const`.
    pub(super) fn parse_decl_specifiers(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let start = self.peek().span;
        let mut is_const = self.eat_cv_qualifiers();

        let base = if self.peek().kind.is_builtin_type_word() {
            let (builtin, inner_const) = self.parse_builtin_type()?;
            is_const |= inner_const;
            builtin
        } else {
            if self.eat(TokenKind::Typename).is_none() && self.peek().kind.is_record_key() {
                // Elaborated type specifier: `struct Foo *p`.
                self.advance();
                if self.check(TokenKind::LeftBrace) {
                    return Err(ParseError::unsupported(self.peek().span, "anonymous records"));
                }
            }
            if !self.check(TokenKind::Identifier) && !self.check(TokenKind::ColonColon) {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedType,
                    self.peek().span,
                    format!("expected type, found '{}'", self.peek().lexeme),
                ));
            }
            TypeExpr::Named(self.parse_path()?)
        };

        is_const |= self.eat_cv_qualifiers();
        if is_const {
            let span = self.span_from(start);
            Ok(TypeExpr::Const {
                inner: self.alloc(base),
                span,
            })
        } else {
            Ok(base)
        }
    }

    /// Consume any `const`/`volatile` run; returns whether `const` was seen.
    fn eat_cv_qualifiers(&mut self) -> bool {
        let mut is_const = false;
        loop {
            if self.eat(TokenKind::Const).is_some() {
                is_const = true;
            } else if self.eat(TokenKind::Volatile).is_none() {
                return is_const;
            }
        }
    }

    /// Parse a run of builtin type words into a single builtin. cv-qualifiers
    /// may be interleaved (`unsigned const int`); returns whether `const` was
    /// among them.
    fn parse_builtin_type(&mut self) -> Result<(TypeExpr<'ast>, bool), ParseError> {
        let start = self.peek().span;
        let mut words = BuiltinWords::default();
        let mut is_const = false;

        loop {
            let kind = self.peek().kind;
            if kind.is_builtin_type_word() {
                words.add(kind);
                self.advance();
            } else if matches!(kind, TokenKind::Const | TokenKind::Volatile)
                && self.peek_nth(1).kind.is_builtin_type_word()
            {
                is_const |= kind == TokenKind::Const;
                self.advance();
            } else {
                break;
            }
        }

        let span = self.span_from(start);
        let kind = words.resolve().ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::ExpectedType,
                span,
                "invalid combination of type specifiers",
            )
        })?;
        Ok((TypeExpr::Builtin { kind, span }, is_const))
    }

    /// Parse `*`, `* const`, `&` and `&&` declarator operators.
    pub(super) fn parse_ptr_operators(&mut self, mut ty: TypeExpr<'ast>) -> TypeExpr<'ast> {
        loop {
            match self.peek().kind {
                TokenKind::Star => {
                    self.advance();
                    let span = self.span_from(ty.span());
                    ty = TypeExpr::Pointer {
                        pointee: self.alloc(ty),
                        span,
                    };
                    if self.eat_cv_qualifiers() {
                        let span = self.span_from(ty.span());
                        ty = TypeExpr::Const {
                            inner: self.alloc(ty),
                            span,
                        };
                    }
                }
                TokenKind::Amp | TokenKind::AmpAmp => {
                    self.advance();
                    let span = self.span_from(ty.span());
                    ty = TypeExpr::Reference {
                        referent: self.alloc(ty),
                        span,
                    };
                }
                _ => return ty,
            }
        }
    }

    /// Parse `[N][M]` suffixes. `T x[2][3]` is an array of 2 arrays of 3.
    pub(super) fn parse_array_suffixes(&mut self, element: TypeExpr<'ast>) -> Result<TypeExpr<'ast>, ParseError> {
        let mut bounds = Vec::new();
        while self.eat(TokenKind::LeftBracket).is_some() {
            if self.check(TokenKind::RightBracket) {
                return Err(ParseError::unsupported(self.peek().span, "arrays of unknown bound"));
            }
            let len = self.parse_expr(true)?;
            self.expect(TokenKind::RightBracket)?;
            bounds.push((len, self.prev_span()));
        }

        let mut ty = element;
        for (len, end) in bounds.into_iter().rev() {
            let span = element.span().merge(end);
            ty = TypeExpr::Array {
                element: self.alloc(ty),
                len: self.alloc(len),
                span,
            };
        }
        Ok(ty)
    }

    /// Parse a possibly qualified name with optional template arguments.
    ///
    /// Grammar: `'::'? (IDENT '::')* IDENT ('<' TEMPLATE_ARGS '>')?`
    pub(super) fn parse_path(&mut self) -> Result<PathExpr<'ast>, ParseError> {
        let start = self.peek().span;
        let absolute = self.eat(TokenKind::ColonColon).is_some();

        let mut scope = self.new_vec();
        let first = self.expect(TokenKind::Identifier)?;
        let mut name = Ident::new(first.lexeme, first.span);
        while self.check(TokenKind::ColonColon) && self.peek_nth(1).kind == TokenKind::Identifier {
            self.advance();
            scope.push(name);
            let next = self.advance();
            name = Ident::new(next.lexeme, next.span);
        }

        let args = if self.check(TokenKind::Less) {
            Some(self.parse_template_args()?)
        } else {
            None
        };

        if args.is_some() && self.check(TokenKind::ColonColon) {
            return Err(ParseError::unsupported(
                self.peek().span,
                "names nested in template specializations",
            ));
        }

        Ok(PathExpr {
            absolute,
            scope: scope.into_bump_slice(),
            name,
            args,
            span: self.span_from(start),
        })
    }

    /// Parse `< arg, ... >`.
    pub(super) fn parse_template_args(&mut self) -> Result<&'ast [TemplateArgExpr<'ast>], ParseError> {
        self.expect(TokenKind::Less)?;
        let mut args = self.new_vec();
        if self.eat(TokenKind::Greater).is_some() {
            return Ok(args.into_bump_slice());
        }
        loop {
            args.push(self.parse_template_arg()?);
            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            self.expect(TokenKind::Greater)?;
            return Ok(args.into_bump_slice());
        }
    }

    /// Parse one template argument.
    ///
    /// Unambiguous type starts (builtin words, cv-qualifiers, `typename`,
    /// class keys) parse as types. A name is tried as a type first: if the
    /// type ends exactly at `,` or `>` it is kept (a bare name stays
    /// [`TemplateArgExpr::Ambiguous`]). Otherwise the argument is re-parsed
    /// as an expression in which an unparenthesized `>` ends the argument.
    pub(super) fn parse_template_arg(&mut self) -> Result<TemplateArgExpr<'ast>, ParseError> {
        ensure_sufficient_stack(|| {
            let kind = self.peek().kind;
            if kind.is_builtin_type_word()
                || kind.is_record_key()
                || matches!(kind, TokenKind::Const | TokenKind::Volatile | TokenKind::Typename)
            {
                return Ok(TemplateArgExpr::Type(self.parse_type()?));
            }

            if matches!(kind, TokenKind::Identifier | TokenKind::ColonColon) {
                let saved = self.position;
                if let Some(arg) = self.try_type_template_arg() {
                    return Ok(arg);
                }
                self.position = saved;
            }

            Ok(TemplateArgExpr::Expr(self.parse_expr(false)?))
        })
    }

    fn try_type_template_arg(&mut self) -> Option<TemplateArgExpr<'ast>> {
        let path = self.parse_path().ok()?;
        if self.at_template_arg_end() {
            return Some(match path.args {
                Some(_) => TemplateArgExpr::Type(TypeExpr::Named(path)),
                None => TemplateArgExpr::Ambiguous(path),
            });
        }

        let after_name = self.position;
        let base = TypeExpr::Named(path);
        let base = if self.eat_cv_qualifiers() {
            let span = self.span_from(base.span());
            TypeExpr::Const {
                inner: self.alloc(base),
                span,
            }
        } else {
            base
        };
        let ty = self.parse_ptr_operators(base);
        let ty = self.parse_array_suffixes(ty).ok()?;
        (self.position != after_name && self.at_template_arg_end()).then_some(TemplateArgExpr::Type(ty))
    }

    fn at_template_arg_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Comma | TokenKind::Greater)
    }
}

/// Accumulates builtin type words in any order.
#[derive(Default)]
struct BuiltinWords {
    void: u8,
    bool_: u8,
    char_: u8,
    short: u8,
    int: u8,
    long: u8,
    signed: u8,
    unsigned: u8,
    float: u8,
    double: u8,
}

impl BuiltinWords {
    fn add(&mut self, kind: TokenKind) {
        let slot = match kind {
            TokenKind::Void => &mut self.void,
            TokenKind::Bool => &mut self.bool_,
            TokenKind::Char => &mut self.char_,
            TokenKind::Short => &mut self.short,
            TokenKind::Int => &mut self.int,
            TokenKind::Long => &mut self.long,
            TokenKind::Signed => &mut self.signed,
            TokenKind::Unsigned => &mut self.unsigned,
            TokenKind::Float => &mut self.float,
            TokenKind::Double => &mut self.double,
            _ => return,
        };
        *slot = slot.saturating_add(1);
    }

    fn resolve(&self) -> Option<BuiltinKind> {
        let sign_words = self.signed + self.unsigned;
        if sign_words > 1 || self.int > 1 || self.short > 1 || self.long > 2 {
            return None;
        }
        let others = self.void + self.bool_ + self.char_ + self.float + self.double;
        if others > 1 {
            return None;
        }

        let plain_only = sign_words == 0 && self.short == 0 && self.long == 0 && self.int == 0;
        if self.void == 1 {
            return plain_only.then_some(BuiltinKind::Void);
        }
        if self.bool_ == 1 {
            return plain_only.then_some(BuiltinKind::Bool);
        }
        if self.float == 1 {
            return plain_only.then_some(BuiltinKind::Float);
        }
        if self.double == 1 {
            // `long double` is not modelled.
            return plain_only.then_some(BuiltinKind::Double);
        }

        let unsigned = self.unsigned == 1;
        if self.char_ == 1 {
            if self.short + self.long + self.int > 0 {
                return None;
            }
            return Some(match (self.signed, self.unsigned) {
                (1, _) => BuiltinKind::SChar,
                (_, 1) => BuiltinKind::UChar,
                _ => BuiltinKind::Char,
            });
        }
        if self.short == 1 {
            if self.long > 0 {
                return None;
            }
            return Some(if unsigned { BuiltinKind::UShort } else { BuiltinKind::Short });
        }
        Some(match (self.long, unsigned) {
            (0, false) => BuiltinKind::Int,
            (0, true) => BuiltinKind::UInt,
            (1, false) => BuiltinKind::Long,
            (1, true) => BuiltinKind::ULong,
            (_, false) => BuiltinKind::LongLong,
            (_, true) => BuiltinKind::ULongLong,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    fn builtin(source: &str) -> Option<BuiltinKind> {
        let arena = Bump::new();
        match Parser::type_expr(source, &arena) {
            Ok(TypeExpr::Builtin { kind, .. }) => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn builtin_specifier_sequences() {
        assert_eq!(builtin("int"), Some(BuiltinKind::Int));
        assert_eq!(builtin("unsigned"), Some(BuiltinKind::UInt));
        assert_eq!(builtin("long unsigned int"), Some(BuiltinKind::ULong));
        assert_eq!(builtin("long long"), Some(BuiltinKind::LongLong));
        assert_eq!(builtin("unsigned long long int"), Some(BuiltinKind::ULongLong));
        assert_eq!(builtin("signed char"), Some(BuiltinKind::SChar));
        assert_eq!(builtin("char"), Some(BuiltinKind::Char));
        assert_eq!(builtin("short int"), Some(BuiltinKind::Short));
        assert_eq!(builtin("bool"), Some(BuiltinKind::Bool));
    }

    #[test]
    fn invalid_specifier_sequences() {
        let arena = Bump::new();
        assert!(Parser::type_expr("long double", &arena).is_err());
        assert!(Parser::type_expr("unsigned bool", &arena).is_err());
        assert!(Parser::type_expr("short long", &arena).is_err());
        assert!(Parser::type_expr("signed unsigned", &arena).is_err());
    }

    #[test]
    fn cv_and_declarators() {
        let arena = Bump::new();
        let ty = Parser::type_expr("const int *const", &arena).unwrap();
        let TypeExpr::Const { inner, .. } = ty else {
            panic!("expected const pointer, got {ty:?}");
        };
        let TypeExpr::Pointer { pointee, .. } = inner else {
            panic!("expected pointer, got {inner:?}");
        };
        assert!(matches!(pointee, TypeExpr::Const { .. }));

        let ty = Parser::type_expr("int const &", &arena).unwrap();
        assert!(matches!(ty, TypeExpr::Reference { referent: TypeExpr::Const { .. }, .. }));
    }

    #[test]
    fn arrays_nest_outer_first() {
        let arena = Bump::new();
        let ty = Parser::type_expr("int[2][3]", &arena).unwrap();
        let TypeExpr::Array { element, len, .. } = ty else {
            panic!("expected array");
        };
        assert!(matches!(len, crate::ast::Expr::Int { value: 2, .. }));
        assert!(matches!(element, TypeExpr::Array { len: crate::ast::Expr::Int { value: 3, .. }, .. }));
    }

    #[test]
    fn qualified_template_id() {
        let arena = Bump::new();
        let ty = Parser::type_expr("::ns::Foo<int, 4>", &arena).unwrap();
        let TypeExpr::Named(path) = ty else {
            panic!("expected named type");
        };
        assert!(path.absolute);
        assert_eq!(path.qualified_name(), "::ns::Foo");
        let args = path.args.unwrap();
        assert_eq!(args.len(), 2);
        assert!(matches!(args[0], TemplateArgExpr::Type(TypeExpr::Builtin { kind: BuiltinKind::Int, .. })));
        assert!(matches!(args[1], TemplateArgExpr::Expr(crate::ast::Expr::Int { value: 4, .. })));
    }

    #[test]
    fn template_arg_disambiguation() {
        let arena = Bump::new();
        let ty = Parser::type_expr("Foo<T, N * 2, T *, Bar<T>, (N > 1)>", &arena).unwrap();
        let TypeExpr::Named(path) = ty else {
            panic!("expected named type");
        };
        let args = path.args.unwrap();
        assert!(matches!(args[0], TemplateArgExpr::Ambiguous(_)));
        assert!(matches!(args[1], TemplateArgExpr::Expr(_)));
        assert!(matches!(args[2], TemplateArgExpr::Type(TypeExpr::Pointer { .. })));
        assert!(matches!(args[3], TemplateArgExpr::Type(TypeExpr::Named(_))));
        assert!(matches!(args[4], TemplateArgExpr::Expr(crate::ast::Expr::Binary { .. })));
    }

    #[test]
    fn nested_template_ids_close_with_adjacent_greaters() {
        let arena = Bump::new();
        let ty = Parser::type_expr("Outer<Inner<int>>", &arena).unwrap();
        let TypeExpr::Named(path) = ty else {
            panic!("expected named type");
        };
        assert_eq!(path.args.map(|a| a.len()), Some(1));
    }

    #[test]
    fn empty_argument_list() {
        let arena = Bump::new();
        let ty = Parser::type_expr("Foo<>", &arena).unwrap();
        assert!(matches!(ty, TypeExpr::Named(PathExpr { args: Some([]), .. })));
    }

    #[test]
    fn anonymous_elaborated_record_is_unsupported() {
        let arena = Bump::new();
        let errors = Parser::type_expr("struct { int x; }", &arena).unwrap_err();
        assert_eq!(errors.iter().next().map(|e| e.kind), Some(ParseErrorKind::NotImplemented));
    }
}
