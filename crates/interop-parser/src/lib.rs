//! Guest declaration parser.
//!
//! This crate provides the lexer and bump-arena AST for the declaration-level
//! subset of the guest language that template interop needs: namespaces,
//! records, class templates, aliases, free functions and `static_assert`.
//!
//! # Example
//!
//! ```
//! use interop_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     template<class T, int num = 4>
//!     struct Foo {
//!         T innerFoo;
//!         T add(T arg) { return innerFoo + arg; }
//!     };
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(unit) => println!("Parsed successfully: {} items", unit.items().len()),
//!     Err(errors) => eprintln!("Parse errors: {}", errors),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{Parser, TranslationUnitAst};
pub use lexer::{Lexer, Token, TokenKind};
