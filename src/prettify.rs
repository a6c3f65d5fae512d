//! Entry points turning raw demangled names into their canonical form

use crate::parser::lexer::is_space;
use crate::parser::parser::Parser;
use crate::printer::{PrintConfig, PrintVisitor, DEFAULT_CONFIG};
use std::fmt;

/// Strips a trailing `[...]` annotation and the whitespace in front of it.
///
/// gcc appends template details to function names, as in
/// `void foo() [with T = int]`.
pub fn remove_template_details(name: &str) -> &str {
    let Some(body) = name.strip_suffix(']') else {
        return name;
    };

    match body.rfind('[') {
        Some(opening) => body[..opening].trim_end_matches(|c: char| c.is_ascii() && is_space(c as u8)),
        None => name,
    }
}

/// Writes the canonical form of the type `raw` into `sink`.
pub fn prettify_type<W: fmt::Write>(sink: W, raw: &str) -> Result<W, fmt::Error> {
    prettify_type_with(sink, raw, &DEFAULT_CONFIG)
}

/// Writes the canonical form of the function signature `raw` into `sink`.
pub fn prettify_function<W: fmt::Write>(sink: W, raw: &str) -> Result<W, fmt::Error> {
    prettify_function_with(sink, raw, &DEFAULT_CONFIG)
}

pub fn prettify_type_with<W: fmt::Write>(
    sink: W,
    raw: &str,
    config: &PrintConfig,
) -> Result<W, fmt::Error> {
    let mut visitor = PrintVisitor::with_config(sink, config);
    Parser::new(raw).parse_type().accept(&mut visitor);
    visitor.finish()
}

pub fn prettify_function_with<W: fmt::Write>(
    sink: W,
    raw: &str,
    config: &PrintConfig,
) -> Result<W, fmt::Error> {
    let mut visitor = PrintVisitor::with_config(sink, config);
    Parser::new(remove_template_details(raw))
        .parse_function()
        .accept(&mut visitor);
    visitor.finish()
}

pub fn type_to_string(raw: &str) -> String {
    // writing into a `String` cannot fail
    prettify_type(String::new(), raw).unwrap_or_default()
}

pub fn function_to_string(raw: &str) -> String {
    prettify_function(String::new(), raw).unwrap_or_default()
}
