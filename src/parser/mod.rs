//! Demangled-name parser
//!
//! This module transforms a demangled C++ name into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (raw name → tokens)
//! - [`parser`]: Shift-reduce engine (tokens → stack → AST)
//! - [`reductions`]: The rules collapsing the stack tail
//! - [`ast`]: AST node definitions
//!
//! # Accepted dialects
//!
//! The grammar is the union of what gcc, clang and msvc emit:
//! - Builtins spanning several keywords: `unsigned long long`
//! - Qualifiers before or after the type: `const foo*`, `foo const*`
//! - Templates, function types and (member) function pointers
//! - Placeholders such as `{anonymous}`, `(anonymous namespace)`, `<lambda_1>`
//! - msvc backtick scopes: `` `int __cdecl foo(void)'::my_type ``
//! - msvc stacktrace decorations: `executable!foo+0x1f`
//!
//! # Parser Implementation
//!
//! Hand-written shift-reduce parser: each token is shifted and the stack tail is
//! reduced immediately. No external parser generator dependencies.

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod reductions;
