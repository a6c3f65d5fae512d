use crate::parser::ast::{
    Function, Identifier, IdentifierContent, OperatorSymbol, Refness, SpecLayer, Type,
};
use crate::parser::lexer::{Keyword, LexToken, Lexer, TokenClass};
use crate::parser::reductions::{self as rules, Delimiter, StackSummary, StackToken, TokenStack};
use crate::visitor::Visitor;

/// Outcome of a parse
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<'a> {
    Type(Type<'a>),
    Function(Function<'a>),
    /// The input could not be reduced; carries the untouched input.
    Unrecognized(&'a str),
}

impl ParseResult<'_> {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ParseResult::Unrecognized(_))
    }

    /// Replays the result, bracketed by `begin`/`end` unless unrecognized.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            ParseResult::Type(ty) => {
                visitor.begin();
                ty.accept(visitor);
                visitor.end();
            }
            ParseResult::Function(function) => {
                visitor.begin();
                function.accept(visitor);
                visitor.end();
            }
            ParseResult::Unrecognized(content) => visitor.unrecognized(content),
        }
    }
}

/// Shift-reduce parser for demangled type and function names
///
/// Every lexer token is shifted onto a stack and immediately reduced as far as
/// the token permits. Input is assumed to be produced by a compiler; grammar
/// violations that can only stem from a broken producer are fatal.
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    stack: TokenStack<'a>,
    has_conversion_operator: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lexer: Lexer::new(source),
            stack: TokenStack::new(),
            has_conversion_operator: false,
        }
    }

    /// Parses the whole input as a single type.
    pub fn parse_type(mut self) -> ParseResult<'a> {
        self.parse();
        rules::try_reduce_as_type(&mut self.stack);

        if self.stack.len() == 1 {
            if let Some(StackToken::Type(ty)) = self.stack.pop() {
                return ParseResult::Type(ty);
            }
        }

        self.unrecognized()
    }

    /// Parses the whole input as a function signature.
    ///
    /// Falls back to a type, as some environments report lambdas as `<lambda()>`
    /// which reduces to a placeholder type rather than a function.
    pub fn parse_function(mut self) -> ParseResult<'a> {
        self.parse();

        if self.has_conversion_operator {
            rules::reduce_as_conversion_operator_function_identifier(&mut self.stack);
        } else if !matches!(self.stack.last(), Some(StackToken::FunctionIdentifier(_))) {
            rules::try_reduce_as_function_identifier(&mut self.stack);
        }

        rules::try_reduce_as_function(&mut self.stack);
        if let [StackToken::Function(_)] = self.stack.as_slice() {
            if let Some(StackToken::Function(function)) = self.stack.pop() {
                return ParseResult::Function(function);
            }
        }

        rules::try_reduce_as_type(&mut self.stack);
        if let [StackToken::Type(_)] = self.stack.as_slice() {
            if let Some(StackToken::Type(ty)) = self.stack.pop() {
                return ParseResult::Type(ty);
            }
        }

        self.unrecognized()
    }

    fn unrecognized(&self) -> ParseResult<'a> {
        log::debug!(
            "unrecognized {:?}, stack left: {}",
            self.source,
            StackSummary(&self.stack)
        );
        ParseResult::Unrecognized(self.source)
    }

    fn parse(&mut self) {
        loop {
            let token = self.lexer.next();
            if token.is_end() {
                break;
            }

            self.handle_token(token);
            log::trace!(
                "{} {:?} => {}",
                token.class,
                token.content,
                StackSummary(&self.stack)
            );
        }
    }

    fn handle_token(&mut self, token: LexToken<'a>) {
        match token.class {
            TokenClass::End => {}
            TokenClass::Space => self.handle_space(),
            TokenClass::Keyword(keyword) => self.handle_keyword(token.content, keyword),
            TokenClass::OperatorOrPunctuator(op) => self.handle_operator(token.content, op.text()),
            TokenClass::Identifier => self
                .stack
                .push(StackToken::Identifier(Identifier::new(token.content))),
        }
    }

    /// Returns the text of the upcoming token if it is an operator.
    fn peek_operator(&self) -> Option<&'static str> {
        self.lexer.peek().as_operator().map(|op| op.text())
    }

    fn drop_space_input(&mut self) {
        if self.lexer.peek().class == TokenClass::Space {
            self.lexer.next();
        }
    }

    /// Builtins spanning several keywords, like `unsigned long long`.
    fn merge_with_next_token(&self) -> bool {
        self.lexer.peek().as_keyword().is_some_and(Keyword::is_type)
    }

    fn push_operator(&mut self, symbol: &'a str) {
        self.stack
            .push(StackToken::Identifier(Identifier::operator(OperatorSymbol::Text(symbol))));
    }

    fn handle_space(&mut self) {
        let is_builtin = matches!(self.stack.last(), Some(StackToken::Identifier(id)) if id.is_builtin());
        if is_builtin && self.merge_with_next_token() {
            let next = self.lexer.next();
            if let Some(StackToken::Identifier(id)) = self.stack.last_mut() {
                if let Some(name) = id.name() {
                    id.content = IdentifierContent::Name(rules::span(
                        self.source,
                        name,
                        next.content,
                    ));
                }
            }
            return;
        }

        if matches!(self.stack.last(), Some(StackToken::Identifier(_))) {
            rules::try_reduce_as_type(&mut self.stack);
        }

        // A space is only significant in front of these; it separates `void ()`
        // (a function type) from `foo()` (a function).
        if matches!(self.peek_operator(), Some("<" | "(" | "{" | "'" | "`")) {
            self.stack.push(StackToken::Space);
        }
    }

    fn handle_keyword(&mut self, content: &'a str, keyword: Keyword) {
        match keyword.text() {
            "const" => {
                let layer = rules::get_or_emplace_specs(&mut self.stack).top_layer_mut();
                assert!(!layer.is_const, "specs is already const");
                layer.is_const = true;
            }
            "volatile" => {
                let layer = rules::get_or_emplace_specs(&mut self.stack).top_layer_mut();
                assert!(!layer.is_volatile, "specs is already volatile");
                layer.is_volatile = true;
            }
            "noexcept" => {
                let specs = rules::get_or_emplace_specs(&mut self.stack);
                assert!(!specs.is_noexcept, "specs already is noexcept");
                specs.is_noexcept = true;
            }
            "operator" => {
                if !self.process_simple_operator() {
                    // A conversion operator cannot be part of a scope, so a name holds at most one.
                    assert!(
                        !self.has_conversion_operator,
                        "multiple conversion operators detected"
                    );
                    self.stack.push(StackToken::OperatorKeyword);
                    self.has_conversion_operator = true;
                }
            }
            // Keeps e.g. `(anonymous class)` from collapsing into function args.
            "class" | "struct" | "enum" => self.stack.push(StackToken::TypeContext(content)),
            _ if keyword.is_type() => self
                .stack
                .push(StackToken::Identifier(Identifier::builtin(content))),
            _ => {}
        }
    }

    /// Reduces a completed type on top into the pending argument sequence.
    fn fold_arg(&mut self) {
        if matches!(self.stack.last(), Some(StackToken::Type(_)))
            || rules::try_reduce_as_type(&mut self.stack)
        {
            rules::try_reduce_as_arg_sequence(&mut self.stack);
        }
    }

    fn handle_operator(&mut self, content: &'a str, op: &str) {
        match op {
            "::" => {
                rules::try_reduce_as_function_identifier(&mut self.stack);
                self.stack.push(StackToken::ScopeResolution(content));
                rules::try_reduce_as_scope_sequence(&mut self.stack);
            }
            "," => {
                self.fold_arg();
                self.stack.push(StackToken::ArgSeparator(content));
            }
            "&" | "&&" => {
                let specs = rules::get_or_emplace_specs(&mut self.stack);
                assert_eq!(specs.refness, Refness::None, "specs already is a reference");
                specs.refness = if op == "&" {
                    Refness::LValue
                } else {
                    Refness::RValue
                };
            }
            "*" => rules::get_or_emplace_specs(&mut self.stack)
                .layers
                .push(SpecLayer::default()),
            "<" => self.stack.push(StackToken::OpeningAngle(content)),
            ">" => {
                self.fold_arg();
                self.stack.push(StackToken::ClosingAngle(content));
                if !rules::try_reduce_as_template_identifier(&mut self.stack) {
                    self.reduce_placeholder(Delimiter::Angle, Delimiter::Angle);
                }
            }
            "(" => self.stack.push(StackToken::OpeningParens(content)),
            ")" => {
                // Nothing but a function pointer declarator is directly followed by `(`;
                // `(__cdecl*)` must not turn into function args.
                let is_next_opening_parens = self.peek_operator() == Some("(");
                if !is_next_opening_parens {
                    self.fold_arg();
                }

                self.stack.push(StackToken::ClosingParens(content));
                let reduced = if is_next_opening_parens {
                    rules::try_reduce_as_function_ptr(&mut self.stack)
                } else {
                    rules::try_reduce_as_function_context(&mut self.stack)
                };
                if !reduced {
                    self.reduce_placeholder(Delimiter::Parens, Delimiter::Parens);
                }
            }
            "{" => self.stack.push(StackToken::OpeningCurly(content)),
            "}" => {
                self.stack.push(StackToken::ClosingCurly(content));
                self.reduce_placeholder(Delimiter::Curly, Delimiter::Curly);
            }
            "`" => self.stack.push(StackToken::OpeningBacktick(content)),
            "'" => self.handle_single_quote(content),
            // Real shifts are consumed by `operator` handling, so these are always
            // two angles, e.g. `foo<bar<int>>`.
            "<<" => {
                self.handle_operator(&content[..1], "<");
                self.handle_operator(&content[1..], "<");
            }
            ">>" => {
                self.handle_operator(&content[..1], ">");
                self.handle_operator(&content[1..], ">");
            }
            // msvc stacktrace entries carry a `+0x1f` offset.
            "+" => {
                let next = self.lexer.peek();
                if next.class == TokenClass::Identifier && next.content.starts_with("0x") {
                    self.lexer.next();
                }
            }
            // msvc stacktrace entries are prefixed with `executable!`.
            "!" => {
                if matches!(self.stack.last(), Some(StackToken::Identifier(_))) {
                    self.stack.pop();
                }
            }
            // Everything else carries no structure; `~foo` reads as `foo`.
            _ => {}
        }
    }

    fn reduce_placeholder(&mut self, open: Delimiter, close: Delimiter) -> bool {
        rules::try_reduce_as_placeholder_identifier_wrapped(&mut self.stack, self.source, open, close)
    }

    fn handle_single_quote(&mut self, content: &'a str) {
        if rules::try_reduce_as_function_identifier(&mut self.stack) {
            self.unwrap_msvc_like_function();
        } else if matches!(
            self.stack.as_slice(),
            [.., StackToken::OpeningBacktick(_), StackToken::ScopeSequence(_), StackToken::Identifier(_)]
        ) {
            // `id1::id2' is just id1::id2
            let index = self.stack.len() - 3;
            self.stack.remove(index);
        } else {
            self.stack.push(StackToken::ClosingSingleQuote(content));
            // msvc wraps in `' while libc++ wraps in ''
            if !self.reduce_placeholder(Delimiter::Backtick, Delimiter::SingleQuote) {
                self.reduce_placeholder(Delimiter::SingleQuote, Delimiter::SingleQuote);
            }
        }
    }

    /// Handles the symbol following `operator`. Returns false for conversion
    /// operators, whose target type still has to be parsed.
    fn process_simple_operator(&mut self) -> bool {
        self.drop_space_input();

        let next = *self.lexer.peek();
        if let Some(op) = next.as_operator() {
            self.lexer.next();

            match op.text() {
                "(" => self.finish_multi_op_operator(next.content, ")"),
                "[" => self.finish_multi_op_operator(next.content, "]"),
                // `operator<<>` is actually `operator< <>`.
                "<<" => {
                    self.drop_space_input();
                    if matches!(self.peek_operator(), Some("(" | "<")) {
                        self.push_operator(next.content);
                    } else {
                        self.push_operator(&next.content[..1]);
                        self.handle_operator(&next.content[1..], "<");
                    }
                }
                _ => self.push_operator(next.content),
            }

            self.drop_space_input();
            return true;
        }

        let Some(keyword) = next.as_keyword() else {
            return false;
        };
        if !matches!(keyword.text(), "new" | "delete" | "co_await") {
            return false;
        }

        self.lexer.next();
        let mut symbol = next.content;
        if keyword.text() != "co_await" {
            self.drop_space_input();
            if self.peek_operator() == Some("[") {
                // `new[]` and `new [ ]` alike
                self.lexer.next();
                self.drop_space_input();
                let closing = self.lexer.next();
                assert_eq!(
                    closing.as_operator().map(|op| op.text()),
                    Some("]"),
                    "invalid input: unterminated `{}[`",
                    next.content
                );
                symbol = rules::span(self.source, next.content, closing.content);
            }
        }

        self.push_operator(symbol);
        self.drop_space_input();

        true
    }

    fn finish_multi_op_operator(&mut self, opening: &'a str, expected_closing: &str) {
        let closing = self.lexer.next();
        assert_eq!(
            closing.as_operator().map(|op| op.text()),
            Some(expected_closing),
            "invalid input: expected `{}` after `operator{}`",
            expected_closing,
            opening
        );

        let symbol = rules::span(self.source, opening, closing.content);
        self.push_operator(symbol);
    }

    /// msvc wraps function-local scopes like `` `int __cdecl foo(void)'::my_type ``.
    /// Strips the return type and the backtick so the function becomes a scope.
    fn unwrap_msvc_like_function(&mut self) {
        let Some(StackToken::FunctionIdentifier(function)) = self.stack.pop() else {
            panic!("invalid state: expected a function identifier");
        };

        let scopes = match self.stack.last() {
            Some(StackToken::ScopeSequence(_)) => self.stack.pop(),
            _ => None,
        };

        if matches!(self.stack.last(), Some(StackToken::Type(_))) {
            self.stack.pop();
        }

        assert!(
            matches!(self.stack.last(), Some(StackToken::OpeningBacktick(_))),
            "invalid state: {}",
            StackSummary(&self.stack)
        );
        self.stack.pop();

        // Spaces in front of backticks are gathered, too.
        if matches!(self.stack.last(), Some(StackToken::Space)) {
            self.stack.pop();
        }

        assert!(
            !matches!(self.stack.last(), Some(StackToken::ScopeSequence(_))),
            "invalid state: {}",
            StackSummary(&self.stack)
        );

        if let Some(scopes) = scopes {
            self.stack.push(scopes);
        }
        self.stack.push(StackToken::FunctionIdentifier(function));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Scope;

    fn parse_type(input: &str) -> Type<'_> {
        match Parser::new(input).parse_type() {
            ParseResult::Type(ty) => ty,
            other => panic!("Expected type for {:?}, got {:?}", input, other),
        }
    }

    fn parse_function(input: &str) -> Function<'_> {
        match Parser::new(input).parse_function() {
            ParseResult::Function(function) => function,
            other => panic!("Expected function for {:?}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_parse_builtin() {
        match parse_type("unsigned long long") {
            Type::Regular(regular) => {
                assert!(regular.identifier.is_builtin());
                assert_eq!(regular.identifier.name(), Some("unsigned long long"));
                assert!(regular.scopes.is_none());
            }
            _ => panic!("Expected regular type"),
        }
    }

    #[test]
    fn test_parse_qualified_type() {
        match parse_type("volatile foo const* volatile** const&") {
            Type::Regular(regular) => {
                assert_eq!(regular.identifier.name(), Some("foo"));
                let layers = &regular.specs.layers;
                assert_eq!(layers.len(), 4);
                assert!(layers[0].is_const && layers[0].is_volatile);
                assert!(layers[1].is_volatile && !layers[1].is_const);
                assert_eq!(layers[2], SpecLayer::default());
                assert!(layers[3].is_const);
                assert_eq!(regular.specs.refness, Refness::LValue);
            }
            _ => panic!("Expected regular type"),
        }
    }

    #[test]
    fn test_parse_msvc_pointer_decoration() {
        match parse_type("int* __ptr64&& __ptr64") {
            Type::Regular(regular) => {
                assert!(regular.specs.has_ptr());
                assert_eq!(regular.specs.refness, Refness::RValue);
            }
            _ => panic!("Expected regular type"),
        }
    }

    #[test]
    fn test_parse_scoped_template() {
        match parse_type("std::vector<int, std::allocator<int>>") {
            Type::Regular(regular) => {
                let scopes = regular.scopes.expect("scopes");
                assert_eq!(scopes.scopes.len(), 1);
                let args = regular.identifier.template_args.expect("template args");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("Expected regular type"),
        }
    }

    #[test]
    fn test_parse_function_type() {
        match parse_type("void (*(float))(int)") {
            Type::Function(function) => {
                assert_eq!(function.context.args.len(), 1);
                assert!(matches!(*function.return_type, Type::FunctionPtr(_)));
            }
            other => panic!("Expected function type, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_member_function_ptr() {
        match parse_type("void (__cdecl foo::*)()") {
            Type::FunctionPtr(ptr) => {
                assert!(ptr.return_type.is_void());
                assert!(ptr.scopes.is_some());
                assert!(ptr.specs.has_ptr());
                assert!(ptr.context.args.is_empty());
            }
            other => panic!("Expected function pointer type, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_placeholders() {
        for input in ["{place holder}", "(place holder)", "<anon class>", "`placeholder'", "'place holder'"] {
            match parse_type(input) {
                Type::Regular(regular) => assert_eq!(regular.identifier.name(), Some(input)),
                other => panic!("Expected placeholder for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_parse_function() {
        let function = parse_function("const std::string& foo::bar(int, char) const noexcept");
        assert!(function.return_type.is_some());
        assert_eq!(function.scopes.map(|s| s.scopes.len()), Some(1));
        assert_eq!(function.identifier.identifier.name(), Some("bar"));
        let context = &function.identifier.context;
        assert_eq!(context.args.len(), 2);
        assert!(context.specs.layers[0].is_const);
        assert!(context.specs.is_noexcept);
    }

    #[test]
    fn test_parse_msvc_function_local_type() {
        match parse_type("struct `public: void __cdecl foo::bar(int) __ptr64'::my_type") {
            Type::Regular(regular) => {
                let scopes = regular.scopes.expect("scopes").scopes;
                assert_eq!(scopes.len(), 2);
                assert!(matches!(&scopes[1], Scope::Function(f) if f.identifier.name() == Some("bar")));
                assert_eq!(regular.identifier.name(), Some("my_type"));
            }
            _ => panic!("Expected regular type"),
        }
    }

    #[test]
    fn test_parse_operators() {
        for (input, symbol) in [
            ("operator+()", "+"),
            ("operator()()", "()"),
            ("operator[]()", "[]"),
            ("operator new[]()", "new[]"),
            ("operator<=>()", "<=>"),
            ("operator<<()", "<<"),
            ("operator co_await()", "co_await"),
        ] {
            let function = parse_function(input);
            assert_eq!(
                function.identifier.identifier.content,
                IdentifierContent::Operator(OperatorSymbol::Text(symbol)),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_templated_left_angle_operator() {
        let function = parse_function("operator<<>()");
        let identifier = &function.identifier.identifier;
        assert_eq!(identifier.content, IdentifierContent::Operator(OperatorSymbol::Text("<")));
        assert!(identifier.template_args.as_ref().is_some_and(|args| args.is_empty()));
    }

    #[test]
    fn test_parse_conversion_operator() {
        let function = parse_function("foo::operator const bar&() const");
        match &function.identifier.identifier.content {
            IdentifierContent::Operator(OperatorSymbol::Conversion(target)) => match target.as_ref() {
                Type::Regular(regular) => {
                    assert_eq!(regular.identifier.name(), Some("bar"));
                    assert!(regular.specs.layers[0].is_const);
                    assert_eq!(regular.specs.refness, Refness::LValue);
                }
                other => panic!("Expected regular conversion target, got {:?}", other),
            },
            other => panic!("Expected conversion operator, got {:?}", other),
        }
        assert!(function.identifier.context.specs.layers[0].is_const);
    }

    #[test]
    fn test_parse_stacktrace_entry() {
        // no call signature, so the function parse falls back to a type
        match Parser::new("executable!foo+0x1337").parse_function() {
            ParseResult::Type(Type::Regular(regular)) => {
                assert_eq!(regular.identifier.name(), Some("foo"));
            }
            other => panic!("Expected regular type, got {:?}", other),
        }
    }

    #[test]
    fn test_destructor_tilde_is_dropped() {
        let function = parse_function("foo::~foo()");
        assert_eq!(function.identifier.identifier.name(), Some("foo"));
        assert_eq!(function.scopes.map(|s| s.scopes.len()), Some(1));
    }

    #[test]
    #[should_panic(expected = "already const")]
    fn test_doubled_const_is_fatal() {
        Parser::new("const foo const").parse_type();
    }

    #[test]
    #[should_panic(expected = "already volatile")]
    fn test_doubled_volatile_is_fatal() {
        Parser::new("volatile foo volatile").parse_type();
    }

    #[test]
    #[should_panic(expected = "already is noexcept")]
    fn test_doubled_noexcept_is_fatal() {
        Parser::new("void foo() noexcept noexcept").parse_function();
    }

    #[test]
    #[should_panic(expected = "already is a reference")]
    fn test_second_reference_is_fatal() {
        Parser::new("foo& &").parse_type();
    }

    #[test]
    #[should_panic(expected = "multiple conversion operators")]
    fn test_second_conversion_operator_is_fatal() {
        Parser::new("operator foo::operator bar()").parse_function();
    }

    #[test]
    fn test_unrecognized_keeps_input() {
        assert_eq!(
            Parser::new("Hello, World!").parse_type(),
            ParseResult::Unrecognized("Hello, World!")
        );
        assert!(!Parser::new("").parse_function().is_recognized());
    }
}
