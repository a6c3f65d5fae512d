//! # Introduction
//!
//! cpp-name-prettifier turns the names compilers report for C++ types and
//! functions (demangled `typeid` names, `source_location` function names,
//! `std::stacktrace` entries) into a short canonical form. gcc, clang and msvc
//! spell the same construct differently; the printed form does not.
//!
//! ```text
//! class std::basic_string<char,struct std::char_traits<char>,class std::allocator<char> >
//!     => std::basic_string<...>
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Raw name → Lexer → Parser → AST → Visitor replay → PrintVisitor → sink
//! ```
//!
//! 1. [`parser::lexer`] splits the name into classified tokens.
//! 2. [`parser::parser`] shifts them onto a stack and collapses it with the
//!    rules in [`parser::reductions`] into a [`parser::ast::Type`] or
//!    [`parser::ast::Function`].
//! 3. The tree replays itself into any [`visitor::Visitor`].
//! 4. [`printer::PrintVisitor`] writes the canonical text, eliding template and
//!    call arguments and rewriting dialect-specific spellings.
//!
//! Input that does not reduce to a single type or function is printed verbatim.
//!
//! ## Usage
//!
//! ```
//! use cpp_name_prettifier::{prettify_function, prettify_type};
//!
//! let out = prettify_type(String::new(), "const foo*").unwrap();
//! assert_eq!(out, "foo const*");
//!
//! let out = prettify_function(String::new(), "ret my_function<void>(void)").unwrap();
//! assert_eq!(out, "ret my_function<...>()");
//! ```

pub mod parser;
pub mod prettify;
pub mod printer;
pub mod visitor;

pub use prettify::{
    function_to_string, prettify_function, prettify_function_with, prettify_type,
    prettify_type_with, remove_template_details, type_to_string,
};
pub use printer::{PrintConfig, PrintVisitor};
pub use visitor::Visitor;
