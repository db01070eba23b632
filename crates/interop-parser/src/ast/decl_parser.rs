//! Declaration parsing.
//!
//! Covers namespaces, records, class templates, aliases, free functions and
//! `static_assert`. Function bodies, constructor initializer lists and
//! member initializers are skipped by balanced-delimiter matching.
//!
//! Declarations that cannot affect type layout and cannot be named by the
//! host (function templates, out-of-line member definitions, operator
//! overloads) are parsed over and dropped. Constructs that would change
//! layout or name lookup but are not modelled (base classes, nested records,
//! enumerations, alias templates, ...) are reported as unsupported.

use bumpalo::collections::Vec as BumpVec;
use interop_core::{MethodKind, ParseError, ParseErrorKind, RecordTag, Span};

use crate::lexer::TokenKind;

use super::TranslationUnitAst;
use super::decl::*;
use super::parser::Parser;
use super::types::{Ident, TemplateArgExpr, TypeExpr};

/// Specifier keywords seen before a declaration.
#[derive(Debug, Default, Clone, Copy)]
struct Specifiers {
    is_static: bool,
    is_virtual: bool,
}

impl<'ast> Parser<'ast> {
    pub(super) fn parse_translation_unit(&mut self) -> TranslationUnitAst<'ast> {
        let start = self.peek().span;
        let mut items = self.new_vec();
        loop {
            items.extend_from_slice(self.parse_items());
            if self.is_eof() {
                break;
            }
            // Stray `}` at file scope; report it and keep going.
            let token = self.advance();
            self.errors.push(ParseError::unexpected_token(token.span, token.lexeme));
        }
        TranslationUnitAst::new(items.into_bump_slice(), self.span_from(start))
    }

    /// Parse items until `}` or end of input, recovering from errors.
    fn parse_items(&mut self) -> &'ast [Item<'ast>] {
        let mut items = self.new_vec();
        while !self.is_eof() && !self.check(TokenKind::RightBrace) {
            match self.parse_item() {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }
        items.into_bump_slice()
    }

    fn parse_item(&mut self) -> Result<Option<Item<'ast>>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(None)
            }
            TokenKind::Namespace => self.parse_namespace().map(|ns| Some(Item::Namespace(ns))),
            TokenKind::Template => self.parse_template(),
            TokenKind::Struct | TokenKind::Class | TokenKind::Union if self.is_record_declaration() => {
                let tag = self.parse_record_key();
                let record = self.parse_record(tag, token.span)?;
                Ok(Some(Item::Record(record)))
            }
            TokenKind::Enum => Err(ParseError::unsupported(token.span, "enumerations")),
            TokenKind::Using => self.parse_using().map(|alias| Some(Item::Alias(alias))),
            TokenKind::Typedef => self.parse_typedef().map(|alias| Some(Item::Alias(alias))),
            TokenKind::StaticAssert => self
                .parse_static_assert()
                .map(|decl| Some(Item::StaticAssert(decl))),
            TokenKind::Extern if self.peek_nth(1).kind == TokenKind::StringLiteral => {
                Err(ParseError::unsupported(token.span, "linkage specifications"))
            }
            _ => self.parse_function(),
        }
    }

    // =========================================
    // Namespaces
    // =========================================

    /// `namespace a { ... }` or `namespace a::b { ... }`.
    fn parse_namespace(&mut self) -> Result<NamespaceDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Namespace)?.span;
        if self.check(TokenKind::LeftBrace) {
            return Err(ParseError::unsupported(start, "anonymous namespaces"));
        }

        let mut names = vec![self.expect_ident()?];
        while self.eat(TokenKind::ColonColon).is_some() {
            names.push(self.expect_ident()?);
        }

        self.expect(TokenKind::LeftBrace)?;
        let mut items = self.parse_items();
        self.expect(TokenKind::RightBrace)?;
        let span = self.span_from(start);

        // `namespace a::b { ... }` nests `b` inside `a`.
        let (outermost, nested) = names.split_first().ok_or_else(|| self.expected("identifier"))?;
        for name in nested.iter().rev() {
            let inner = NamespaceDecl {
                name: *name,
                items,
                span,
            };
            items = self.arena.alloc_slice_copy(&[Item::Namespace(inner)]);
        }
        Ok(NamespaceDecl {
            name: *outermost,
            items,
            span,
        })
    }

    // =========================================
    // Records
    // =========================================

    /// Whether a class key starts a record declaration rather than an
    /// elaborated type specifier (`struct Foo *make();`).
    fn is_record_declaration(&self) -> bool {
        match self.peek_nth(1).kind {
            TokenKind::LeftBrace => true,
            TokenKind::Identifier => {
                let next = self.peek_nth(2);
                matches!(
                    next.kind,
                    TokenKind::Semicolon | TokenKind::LeftBrace | TokenKind::Colon | TokenKind::Less
                ) || next.kind == TokenKind::Identifier && next.lexeme == "final"
            }
            _ => false,
        }
    }

    fn parse_record_key(&mut self) -> RecordTag {
        match self.advance().kind {
            TokenKind::Union => RecordTag::Union,
            TokenKind::Class => RecordTag::Class,
            _ => RecordTag::Struct,
        }
    }

    /// Parse the rest of a record after its class key.
    fn parse_record(&mut self, tag: RecordTag, start: Span) -> Result<RecordDecl<'ast>, ParseError> {
        if self.check(TokenKind::LeftBrace) {
            return Err(ParseError::unsupported(start, "anonymous records"));
        }
        let name = self.expect_ident()?;

        if self.check(TokenKind::Less) {
            return Err(ParseError::unsupported(self.peek().span, "template specializations"));
        }
        if self.check(TokenKind::Identifier) && self.peek().lexeme == "final" {
            self.advance();
        }
        if self.check(TokenKind::Colon) {
            return Err(ParseError::unsupported(self.peek().span, "base classes"));
        }

        if self.eat(TokenKind::Semicolon).is_some() {
            return Ok(RecordDecl {
                tag,
                name,
                members: None,
                span: self.span_from(start),
            });
        }

        self.expect(TokenKind::LeftBrace)?;
        let members = self.parse_members(name)?;
        self.expect(TokenKind::RightBrace)?;
        if !self.check(TokenKind::Semicolon) {
            return Err(if self.check(TokenKind::Identifier) || self.check(TokenKind::Star) {
                ParseError::unsupported(self.peek().span, "variables declared with a record definition")
            } else {
                self.expected("';' after record definition")
            });
        }
        self.advance();

        Ok(RecordDecl {
            tag,
            name,
            members: Some(members),
            span: self.span_from(start),
        })
    }

    /// Parse record members up to (not including) the closing brace.
    fn parse_members(&mut self, record: Ident<'ast>) -> Result<&'ast [Member<'ast>], ParseError> {
        let mut members = self.new_vec();
        while !self.check(TokenKind::RightBrace) {
            if self.is_eof() {
                return Err(ParseError::unexpected_eof(self.peek().span));
            }
            if let Err(error) = self.parse_member(record, &mut members) {
                self.errors.push(error);
                self.synchronize();
            }
        }
        Ok(members.into_bump_slice())
    }

    fn parse_member(
        &mut self,
        record: Ident<'ast>,
        members: &mut BumpVec<'ast, Member<'ast>>,
    ) -> Result<(), ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Semicolon => {
                self.advance();
                return Ok(());
            }
            TokenKind::Public | TokenKind::Private | TokenKind::Protected => {
                self.advance();
                self.expect(TokenKind::Colon)?;
                return Ok(());
            }
            TokenKind::StaticAssert => {
                members.push(Member::StaticAssert(self.parse_static_assert()?));
                return Ok(());
            }
            TokenKind::Using => {
                members.push(Member::Alias(self.parse_using()?));
                return Ok(());
            }
            TokenKind::Typedef => {
                members.push(Member::Alias(self.parse_typedef()?));
                return Ok(());
            }
            TokenKind::Template => return Err(ParseError::unsupported(token.span, "member templates")),
            TokenKind::Friend => return Err(ParseError::unsupported(token.span, "friend declarations")),
            TokenKind::Enum => return Err(ParseError::unsupported(token.span, "nested enumerations")),
            TokenKind::Struct | TokenKind::Class | TokenKind::Union if self.is_record_declaration() => {
                return Err(ParseError::unsupported(token.span, "nested records"));
            }
            _ => {}
        }

        let specifiers = self.parse_specifiers();
        let start = token.span;

        // Destructor: `~Name()`.
        if self.check(TokenKind::Tilde) {
            self.advance();
            let name = self.expect_ident()?;
            if name.name != record.name {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidSyntax,
                    name.span,
                    format!("expected the class name after '~', found '{}'", name.name),
                ));
            }
            let destructor_name = Ident::new(self.arena.alloc_str(&format!("~{}", name.name)), name.span);
            let method = self.parse_method_rest(destructor_name, MethodKind::Destructor, None, specifiers, start)?;
            members.push(Member::Method(method));
            return Ok(());
        }

        // Constructor: `Name(...)`.
        if self.check(TokenKind::Identifier)
            && self.peek().lexeme == record.name
            && self.peek_nth(1).kind == TokenKind::LeftParen
        {
            let name = self.expect_ident()?;
            let method = self.parse_method_rest(name, MethodKind::Constructor, None, specifiers, start)?;
            members.push(Member::Method(method));
            return Ok(());
        }

        if self.check(TokenKind::Operator) {
            // Conversion operator: `operator bool() const;`
            return self.skip_operator_declaration();
        }

        let base = self.parse_decl_specifiers()?;
        let mut first = true;
        loop {
            let ty = self.parse_ptr_operators(base);
            if self.check(TokenKind::Operator) {
                return self.skip_operator_declaration();
            }
            let name = self.expect_ident()?;

            if first && self.check(TokenKind::LeftParen) {
                let method = self.parse_method_rest(name, MethodKind::Method, Some(ty), specifiers, start)?;
                members.push(Member::Method(method));
                return Ok(());
            }
            first = false;

            let ty = self.parse_array_suffixes(ty)?;
            if self.check(TokenKind::Colon) {
                return Err(ParseError::unsupported(self.peek().span, "bit-fields"));
            }
            self.skip_initializer()?;
            members.push(Member::Field(FieldDecl {
                name,
                ty,
                is_static: specifiers.is_static,
                span: self.span_from(name.span),
            }));

            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            self.expect(TokenKind::Semicolon)?;
            return Ok(());
        }
    }

    /// Parse the parameter list and trailing parts of a member function.
    fn parse_method_rest(
        &mut self,
        name: Ident<'ast>,
        kind: MethodKind,
        return_type: Option<TypeExpr<'ast>>,
        specifiers: Specifiers,
        start: Span,
    ) -> Result<MethodDecl<'ast>, ParseError> {
        let params = self.parse_params()?;

        let mut is_const = false;
        loop {
            match self.peek().kind {
                TokenKind::Const => {
                    self.advance();
                    is_const = true;
                }
                TokenKind::Volatile | TokenKind::Amp | TokenKind::AmpAmp => {
                    self.advance();
                }
                TokenKind::Identifier if matches!(self.peek().lexeme, "override" | "final") => {
                    self.advance();
                }
                TokenKind::Identifier if self.peek().lexeme == "noexcept" => {
                    self.advance();
                    if self.check(TokenKind::LeftParen) {
                        self.skip_balanced(TokenKind::LeftParen, TokenKind::RightParen)?;
                    }
                }
                TokenKind::Arrow => {
                    return Err(ParseError::unsupported(self.peek().span, "trailing return types"));
                }
                _ => break,
            }
        }

        let has_body = self.parse_function_tail(kind == MethodKind::Constructor)?;

        Ok(MethodDecl {
            name,
            kind,
            return_type,
            params,
            is_const,
            is_virtual: specifiers.is_virtual,
            is_static: specifiers.is_static,
            has_body,
            span: self.span_from(start),
        })
    }

    /// Parse what follows a function declarator: `;`, `= 0;`, `= default;`,
    /// `= delete;`, or a body (after an optional constructor initializer
    /// list). Returns whether a body was present.
    fn parse_function_tail(&mut self, allow_initializers: bool) -> Result<bool, ParseError> {
        if self.eat(TokenKind::Equal).is_some() {
            let token = self.advance();
            let valid = token.kind == TokenKind::IntLiteral && token.lexeme == "0"
                || token.kind == TokenKind::Identifier && matches!(token.lexeme, "default" | "delete");
            if !valid {
                return Err(ParseError::expected_token(
                    token.span,
                    "'0', 'default' or 'delete'",
                    &format!("'{}'", token.lexeme),
                ));
            }
            self.expect(TokenKind::Semicolon)?;
            return Ok(false);
        }

        if self.eat(TokenKind::Semicolon).is_some() {
            return Ok(false);
        }

        if allow_initializers && self.eat(TokenKind::Colon).is_some() {
            self.skip_member_initializers()?;
        }

        if self.check(TokenKind::LeftBrace) {
            self.skip_balanced(TokenKind::LeftBrace, TokenKind::RightBrace)?;
            self.eat(TokenKind::Semicolon);
            return Ok(true);
        }

        Err(self.expected("';' or function body"))
    }

    /// Skip `a(x), b{y}, c()` up to the constructor body.
    fn skip_member_initializers(&mut self) -> Result<(), ParseError> {
        loop {
            // Initializer target: a (possibly qualified, possibly templated) name.
            let target = self.advance();
            if target.kind == TokenKind::Eof {
                return Err(ParseError::unexpected_eof(target.span));
            }
            match self.peek().kind {
                TokenKind::LeftParen => self.skip_balanced(TokenKind::LeftParen, TokenKind::RightParen)?,
                TokenKind::LeftBrace if matches!(target.kind, TokenKind::Identifier | TokenKind::Greater) => {
                    self.skip_balanced(TokenKind::LeftBrace, TokenKind::RightBrace)?
                }
                _ => continue,
            }
            if self.eat(TokenKind::Comma).is_none() {
                return Ok(());
            }
        }
    }

    /// Skip `= expr`, `= {...}` or `{...}` after a field declarator.
    fn skip_initializer(&mut self) -> Result<(), ParseError> {
        if self.eat(TokenKind::Equal).is_some() {
            self.skip_until_list_end(false)?;
        } else if self.check(TokenKind::LeftBrace) {
            self.skip_balanced(TokenKind::LeftBrace, TokenKind::RightBrace)?;
        }
        Ok(())
    }

    /// Operator overloads never affect layout; skip the whole declaration.
    fn skip_operator_declaration(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Operator)?;
        // The operator symbol itself may be `()`, so step past it first.
        if self.check(TokenKind::LeftParen) && self.peek_nth(1).kind == TokenKind::RightParen {
            self.advance();
            self.advance();
        }
        while !self.check(TokenKind::LeftParen) {
            if self.is_eof() {
                return Err(ParseError::unexpected_eof(self.peek().span));
            }
            self.advance();
        }
        self.skip_balanced(TokenKind::LeftParen, TokenKind::RightParen)?;
        while matches!(self.peek().kind, TokenKind::Const | TokenKind::Volatile | TokenKind::Amp | TokenKind::AmpAmp)
            || self.check(TokenKind::Identifier) && matches!(self.peek().lexeme, "override" | "final" | "noexcept")
        {
            self.advance();
        }
        self.parse_function_tail(false)?;
        Ok(())
    }

    fn parse_specifiers(&mut self) -> Specifiers {
        let mut specifiers = Specifiers::default();
        loop {
            match self.peek().kind {
                TokenKind::Static => specifiers.is_static = true,
                TokenKind::Virtual => specifiers.is_virtual = true,
                TokenKind::Inline
                | TokenKind::Constexpr
                | TokenKind::Explicit
                | TokenKind::Mutable
                | TokenKind::Extern => {}
                _ => return specifiers,
            }
            self.advance();
        }
    }

    // =========================================
    // Templates
    // =========================================

    /// `template<...>` followed by a class template declaration.
    ///
    /// Function templates and out-of-line member definitions are skipped.
    fn parse_template(&mut self) -> Result<Option<Item<'ast>>, ParseError> {
        let start = self.expect(TokenKind::Template)?.span;
        self.expect(TokenKind::Less)?;
        if self.check(TokenKind::Greater) {
            return Err(ParseError::unsupported(start, "explicit specializations"));
        }

        let mut params = self.new_vec();
        loop {
            params.push(self.parse_template_param()?);
            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            self.expect(TokenKind::Greater)?;
            break;
        }

        let token = self.peek();
        match token.kind {
            TokenKind::Struct | TokenKind::Class | TokenKind::Union if self.is_record_declaration() => {
                let tag = self.parse_record_key();
                let record = self.parse_record(tag, token.span)?;
                Ok(Some(Item::Template(TemplateDecl {
                    params: params.into_bump_slice(),
                    record,
                    span: self.span_from(start),
                })))
            }
            TokenKind::Using => Err(ParseError::unsupported(token.span, "alias templates")),
            TokenKind::Template => Err(ParseError::unsupported(token.span, "member templates")),
            _ => {
                self.skip_function_like_declaration()?;
                Ok(None)
            }
        }
    }

    /// Skip a declaration that ends either at a `;` or after a body.
    fn skip_function_like_declaration(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::LeftBrace => {
                    self.skip_balanced(TokenKind::LeftBrace, TokenKind::RightBrace)?;
                    self.eat(TokenKind::Semicolon);
                    return Ok(());
                }
                TokenKind::LeftParen => self.skip_balanced(TokenKind::LeftParen, TokenKind::RightParen)?,
                TokenKind::Eof => return Err(ParseError::unexpected_eof(self.peek().span)),
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// `class T`, `typename T = int`, `int N = 4`, `bool`.
    fn parse_template_param(&mut self) -> Result<TemplateParamDecl<'ast>, ParseError> {
        let start = self.peek().span;

        if self.check(TokenKind::Template) {
            return Err(ParseError::unsupported(start, "template template parameters"));
        }

        let is_type_param = matches!(self.peek().kind, TokenKind::Class | TokenKind::Typename)
            && matches!(
                self.peek_nth(1).kind,
                TokenKind::Identifier | TokenKind::Comma | TokenKind::Greater | TokenKind::Equal
            )
            && !(self.peek_nth(1).kind == TokenKind::Identifier
                && self.peek_nth(2).kind == TokenKind::ColonColon);

        if is_type_param {
            self.advance();
            if self.check(TokenKind::Dot) {
                return Err(ParseError::unsupported(self.peek().span, "parameter packs"));
            }
            let name = self.eat_ident();
            let default = if self.eat(TokenKind::Equal).is_some() {
                Some(TemplateArgExpr::Type(self.parse_type()?))
            } else {
                None
            };
            return Ok(TemplateParamDecl {
                kind: TemplateParamKindExpr::Type,
                name,
                default,
                span: self.span_from(start),
            });
        }

        let ty = self.parse_decl_specifiers()?;
        let ty = self.parse_ptr_operators(ty);
        if self.check(TokenKind::Dot) {
            return Err(ParseError::unsupported(self.peek().span, "parameter packs"));
        }
        let name = self.eat_ident();
        let default = if self.eat(TokenKind::Equal).is_some() {
            Some(TemplateArgExpr::Expr(self.parse_expr(false)?))
        } else {
            None
        };
        Ok(TemplateParamDecl {
            kind: TemplateParamKindExpr::Value(ty),
            name,
            default,
            span: self.span_from(start),
        })
    }

    // =========================================
    // Aliases
    // =========================================

    /// `using X = T;`
    fn parse_using(&mut self) -> Result<AliasDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Using)?.span;
        if self.check(TokenKind::Namespace) {
            return Err(ParseError::unsupported(start, "using-directives"));
        }
        if !(self.check(TokenKind::Identifier) && self.peek_nth(1).kind == TokenKind::Equal) {
            return Err(ParseError::unsupported(start, "using-declarations"));
        }
        let name = self.expect_ident()?;
        self.expect(TokenKind::Equal)?;
        let target = self.parse_type()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(AliasDecl {
            name,
            target,
            span: self.span_from(start),
        })
    }

    /// `typedef T X;`, `typedef T *P;`, `typedef T A[4];`
    fn parse_typedef(&mut self) -> Result<AliasDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Typedef)?.span;
        let base = self.parse_decl_specifiers()?;
        let ty = self.parse_ptr_operators(base);
        if self.check(TokenKind::LeftParen) {
            return Err(ParseError::unsupported(self.peek().span, "function pointer typedefs"));
        }
        let name = self.expect_ident()?;
        let target = self.parse_array_suffixes(ty)?;
        if self.check(TokenKind::Comma) {
            return Err(ParseError::unsupported(self.peek().span, "multiple typedef declarators"));
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(AliasDecl {
            name,
            target,
            span: self.span_from(start),
        })
    }

    // =========================================
    // Functions
    // =========================================

    /// A free function declaration or definition.
    fn parse_function(&mut self) -> Result<Option<Item<'ast>>, ParseError> {
        let start = self.peek().span;
        self.parse_specifiers();

        if !self.starts_type() {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedDeclaration,
                self.peek().span,
                format!("expected declaration, found '{}'", self.peek().lexeme),
            ));
        }

        let base = self.parse_decl_specifiers()?;
        let return_type = self.parse_ptr_operators(base);

        if self.check(TokenKind::Operator) {
            self.skip_function_like_declaration()?;
            return Ok(None);
        }
        let name = self.expect_ident()?;

        if self.check(TokenKind::ColonColon) {
            // Out-of-line member definition: `int Foo::get() const { ... }`.
            self.skip_function_like_declaration()?;
            return Ok(None);
        }

        if !self.check(TokenKind::LeftParen) {
            return Err(ParseError::unsupported(name.span, "variables"));
        }

        let params = self.parse_params()?;
        while self.check(TokenKind::Identifier) && self.peek().lexeme == "noexcept" {
            self.advance();
            if self.check(TokenKind::LeftParen) {
                self.skip_balanced(TokenKind::LeftParen, TokenKind::RightParen)?;
            }
        }
        let has_body = self.parse_function_tail(false)?;

        Ok(Some(Item::Function(FunctionDecl {
            name,
            return_type,
            params,
            has_body,
            span: self.span_from(start),
        })))
    }

    /// `( [void] | param (, param)* )`
    fn parse_params(&mut self) -> Result<&'ast [ParamDecl<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = self.new_vec();

        if self.check(TokenKind::Void) && self.peek_nth(1).kind == TokenKind::RightParen {
            self.advance();
        }

        if self.eat(TokenKind::RightParen).is_some() {
            return Ok(params.into_bump_slice());
        }

        loop {
            if self.check(TokenKind::Dot) {
                return Err(ParseError::unsupported(self.peek().span, "variadic functions"));
            }
            let start = self.peek().span;
            let base = self.parse_decl_specifiers()?;
            let ty = self.parse_ptr_operators(base);
            let name = self.eat_ident();
            let ty = self.parse_array_suffixes(ty)?;
            // Array parameters adjust to pointers.
            let ty = match ty {
                TypeExpr::Array { element, span, .. } => TypeExpr::Pointer { pointee: element, span },
                other => other,
            };
            if self.eat(TokenKind::Equal).is_some() {
                self.skip_until_list_end(false)?;
            }
            params.push(ParamDecl {
                ty,
                name,
                span: self.span_from(start),
            });

            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            self.expect(TokenKind::RightParen)?;
            return Ok(params.into_bump_slice());
        }
    }

    // =========================================
    // static_assert
    // =========================================

    /// `static_assert(cond);` or `static_assert(cond, "message");`
    fn parse_static_assert(&mut self) -> Result<StaticAssertDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::StaticAssert)?.span;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(true)?;

        let message = if self.eat(TokenKind::Comma).is_some() {
            let mut text = String::new();
            let first = self.expect(TokenKind::StringLiteral)?;
            text.push_str(unquote(first.lexeme));
            while let Some(next) = self.eat(TokenKind::StringLiteral) {
                text.push_str(unquote(next.lexeme));
            }
            Some(&*self.arena.alloc_str(&text))
        } else {
            None
        };

        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(StaticAssertDecl {
            condition,
            message,
            span: self.span_from(start),
        })
    }

    // =========================================
    // Helpers
    // =========================================

    fn expect_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            Ok(Ident::new(token.lexeme, token.span))
        } else {
            let mut error = self.expected("identifier");
            error.kind = ParseErrorKind::ExpectedIdentifier;
            Err(error)
        }
    }

    fn eat_ident(&mut self) -> Option<Ident<'ast>> {
        self.eat(TokenKind::Identifier)
            .map(|token| Ident::new(token.lexeme, token.span))
    }
}

fn unquote(lexeme: &str) -> &str {
    lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme)
}
