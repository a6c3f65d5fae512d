//! Canonical text output for replayed names
//!
//! [`PrintVisitor`] writes a replay into any [`fmt::Write`] sink. It keeps track
//! of how deep it is inside scopes and argument lists and only prints what is
//! visible at the outermost level, so `std::vector<int, std::allocator<int>>`
//! comes out as `std::vector<...>`.

use crate::parser::lexer::is_digit;
use crate::visitor::Visitor;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Identifier rewrites applied by the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintConfig {
    /// Identifiers printed under another name.
    pub aliases: FxHashMap<String, String>,
    /// Identifiers dropped along with the `::` following them.
    pub ignored: FxHashSet<String>,
}

impl Default for PrintConfig {
    /// The anonymous-namespace spellings of gcc, clang and msvc, plus the inline
    /// namespaces of libstdc++ and libc++.
    fn default() -> Self {
        let aliases = [
            "(anonymous namespace)",
            "{anonymous}",
            "anonymous namespace",
            "anonymous-namespace",
        ]
        .into_iter()
        .map(|spelling| (spelling.to_string(), "{anon-ns}".to_string()))
        .collect();

        let ignored = ["__cxx11", "__1"].into_iter().map(str::to_string).collect();

        Self { aliases, ignored }
    }
}

impl PrintConfig {
    /// A config without any rewrites.
    pub fn empty() -> Self {
        Self {
            aliases: FxHashMap::default(),
            ignored: FxHashSet::default(),
        }
    }

    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.into(), to.into());
        self
    }

    pub fn with_ignored(mut self, name: impl Into<String>) -> Self {
        self.ignored.insert(name.into());
        self
    }

    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }
}

/// Shared read-only default, used by [`PrintVisitor::new`].
pub static DEFAULT_CONFIG: Lazy<PrintConfig> = Lazy::new(PrintConfig::default);

/// Nesting depths deciding what may be printed.
#[derive(Debug, Default)]
struct Context {
    scope_depth: usize,
    function_args_depth: usize,
    template_args_depth: usize,
}

impl Context {
    /// Names of a scope are printed, anything nested deeper is not.
    fn can_print_identifier(&self) -> bool {
        self.scope_depth <= 1 && self.function_args_depth + self.template_args_depth == 0
    }

    fn can_print_decoration(&self) -> bool {
        self.scope_depth == 0 && self.function_args_depth + self.template_args_depth == 0
    }

    fn push_scope(&mut self) {
        self.scope_depth += 1;
    }

    fn pop_scope(&mut self) {
        assert!(self.scope_depth > 0, "unbalanced scope depth");
        self.scope_depth -= 1;
    }

    fn push_function_args(&mut self) {
        self.function_args_depth += 1;
    }

    fn pop_function_args(&mut self) {
        assert!(self.function_args_depth > 0, "unbalanced function-args depth");
        self.function_args_depth -= 1;
    }

    fn push_template_args(&mut self) {
        self.template_args_depth += 1;
    }

    fn pop_template_args(&mut self) {
        assert!(self.template_args_depth > 0, "unbalanced template-args depth");
        self.template_args_depth -= 1;
    }
}

/// Visitor writing the canonical form of a name.
///
/// The first error returned by the sink is kept and nothing is written after
/// it; [`PrintVisitor::finish`] reports it.
pub struct PrintVisitor<'c, W: fmt::Write> {
    out: W,
    config: &'c PrintConfig,
    context: Context,
    ignore_next_scope_resolution: bool,
    error: Option<fmt::Error>,
}

impl<W: fmt::Write> PrintVisitor<'static, W> {
    pub fn new(out: W) -> Self {
        PrintVisitor::with_config(out, Lazy::force(&DEFAULT_CONFIG))
    }
}

impl<'c, W: fmt::Write> PrintVisitor<'c, W> {
    pub fn with_config(out: W, config: &'c PrintConfig) -> Self {
        Self {
            out,
            config,
            context: Context::default(),
            ignore_next_scope_resolution: false,
            error: None,
        }
    }

    /// Hands back the sink, or the first error it reported.
    pub fn finish(self) -> Result<W, fmt::Error> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.out),
        }
    }

    fn write(&mut self, text: &str) {
        if self.error.is_none() {
            if let Err(error) = self.out.write_str(text) {
                self.error = Some(error);
            }
        }
    }

    fn print_identifier(&mut self, text: &str) {
        if self.context.can_print_identifier() {
            self.write(text);
        }
    }

    fn print_decoration(&mut self, text: &str) {
        if self.context.can_print_decoration() {
            self.write(text);
        }
    }

    /// Prints the lambda spellings of the various environments uniformly.
    /// Returns false if `content` is no lambda.
    fn print_lambda(&mut self, content: &str) -> bool {
        // gcc: `{lambda(int)#1}`
        if let Some(rest) = content
            .strip_prefix("{lambda(")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            let suffix = rest.rfind(')').map_or("", |index| &rest[index + 1..]);
            self.print_identifier("lambda");
            self.print_identifier(suffix);
            return true;
        }

        // libc++: `'lambda0'`
        if content.starts_with("'lambda") && content.ends_with('\'') {
            self.print_identifier(&content[1..content.len() - 1]);
            return true;
        }

        // msvc: `<lambda_1>`
        if let Some(rest) = content
            .strip_prefix("<lambda_")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            self.print_identifier("lambda");
            let digits = rest.bytes().take_while(|&c| is_digit(c)).count();
            if digits > 0 {
                self.print_identifier("#");
                self.print_identifier(&rest[..digits]);
            }
            return true;
        }

        // gcc source_location: `<lambda(int)>`
        if let Some(rest) = content.strip_prefix("<lambda(") {
            if rest.ends_with(")>") {
                self.print_identifier("lambda");
                self.print_decoration(if rest.len() == 2 { "()" } else { "(...)" });
                return true;
            }
        }

        false
    }
}

impl<W: fmt::Write> Visitor for PrintVisitor<'_, W> {
    fn unrecognized(&mut self, content: &str) {
        self.print_identifier(content);
    }

    fn begin(&mut self) {}

    fn end(&mut self) {}

    fn begin_type(&mut self) {}

    fn end_type(&mut self) {}

    fn begin_scope(&mut self) {
        self.context.push_scope();
    }

    fn end_scope(&mut self) {
        self.context.pop_scope();

        if !std::mem::take(&mut self.ignore_next_scope_resolution) {
            self.print_decoration("::");
        }
    }

    fn add_identifier(&mut self, content: &str) {
        if self.print_lambda(content) {
            return;
        }

        let mut content = content;
        if content.len() >= 2 && content.starts_with('`') && content.ends_with('\'') {
            let inner = &content[1..content.len() - 1];
            // msvc numbers auxiliary scopes like `1'
            if inner.bytes().all(is_digit) {
                self.ignore_next_scope_resolution = true;
                return;
            }
            content = inner;
        }

        let config = self.config;
        if config.is_ignored(content) {
            self.ignore_next_scope_resolution = true;
            return;
        }

        let content = config.alias(content).unwrap_or(content);
        self.print_identifier(content);
    }

    fn add_arg(&mut self) {}

    fn begin_template_args(&mut self, count: usize) {
        self.print_decoration(if count == 0 { "<" } else { "<..." });
        self.context.push_template_args();
    }

    fn end_template_args(&mut self) {
        self.context.pop_template_args();
        self.print_decoration(">");
    }

    fn add_const(&mut self) {
        self.print_decoration(" const");
    }

    fn add_volatile(&mut self) {
        self.print_decoration(" volatile");
    }

    fn add_noexcept(&mut self) {
        self.print_decoration(" noexcept");
    }

    fn add_ptr(&mut self) {
        self.print_decoration("*");
    }

    fn add_lvalue_ref(&mut self) {
        self.print_decoration("&");
    }

    fn add_rvalue_ref(&mut self) {
        self.print_decoration("&&");
    }

    fn begin_function(&mut self) {}

    fn end_function(&mut self) {}

    fn begin_return_type(&mut self) {}

    fn end_return_type(&mut self) {
        self.print_decoration(" ");
    }

    fn begin_function_args(&mut self, count: usize) {
        self.print_decoration(if count == 0 { "(" } else { "(..." });
        self.context.push_function_args();
    }

    fn end_function_args(&mut self) {
        self.context.pop_function_args();
        self.print_decoration(")");
    }

    fn begin_function_ptr(&mut self) {
        self.print_identifier("(");
    }

    fn end_function_ptr(&mut self) {
        self.print_identifier(")");
    }

    fn begin_operator_identifier(&mut self) {
        self.print_identifier("operator ");
    }

    fn end_operator_identifier(&mut self) {}
}
