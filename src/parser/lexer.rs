//! Lexer for demangled C++ names
//!
//! Converts a raw name into a stream of [`LexToken`]s consumed by the parser.
//! Names produced by demanglers and `source_location` are not valid C++ source
//! (they contain backticks, spaces inside lambda markers, stack-trace offsets and
//! the like), so identifier scanning is permissive: everything that is neither
//! whitespace nor a single-character operator/punctuator belongs to the current
//! identifier. Sorting out what the characters mean is left to the parser.

use once_cell::sync::Lazy;
use std::fmt;
use std::ops::Range;

/// An immutable, sorted and deduplicated set of token texts.
///
/// Supports exact lookup via binary search and prefix queries, which return the
/// contiguous index range of all entries starting with a given prefix.
#[derive(Debug)]
pub struct TokenTable {
    entries: Vec<&'static str>,
}

impl TokenTable {
    fn new(texts: &[&'static str]) -> Self {
        let mut entries = texts.to_vec();
        entries.sort_unstable();
        entries.dedup();

        let table = Self { entries };
        debug_assert!(table.validate(), "token table must be sorted and unique");
        table
    }

    pub fn entries(&self) -> &[&'static str] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the text stored at `index`.
    pub fn get(&self, index: usize) -> &'static str {
        self.entries[index]
    }

    /// Binary search for an exact entry.
    pub fn position(&self, text: &str) -> Option<usize> {
        self.entries
            .binary_search_by(|probe| (*probe).cmp(text))
            .ok()
    }

    /// Index range of all entries that start with `prefix`.
    pub fn prefix_range(&self, prefix: &str) -> Range<usize> {
        let start = self.entries.partition_point(|entry| *entry < prefix);
        let len = self.entries[start..]
            .iter()
            .take_while(|entry| entry.starts_with(prefix))
            .count();

        start..start + len
    }

    /// Checks that the entries are strictly ascending (sorted, no duplicates).
    pub fn validate(&self) -> bool {
        self.entries.windows(2).all(|pair| pair[0] < pair[1])
    }
}

/// All keywords the lexer distinguishes from ordinary identifiers.
pub static KEYWORDS: Lazy<TokenTable> = Lazy::new(|| {
    TokenTable::new(&[
        // visibility
        "public", "protected", "private",
        // specifiers
        "const", "constexpr", "volatile", "noexcept", "static",
        // context
        "operator", "struct", "class", "enum",
        // allocation and coroutines
        "new", "delete", "co_await",
        // builtin types
        "auto", "void", "bool", "char", "char8_t", "char16_t", "char32_t", "wchar_t",
        "double", "float", "int", "long", "__int64", "short", "signed", "unsigned",
        // alternative operator spellings
        "and", "or", "xor", "not", "bitand", "bitor", "compl", "and_eq", "or_eq",
        "xor_eq", "not_eq",
    ])
});

/// All operators and punctuators, see <https://en.cppreference.com/w/cpp/language/operators>.
pub static OPERATORS: Lazy<TokenTable> = Lazy::new(|| {
    TokenTable::new(&[
        // brace-likes
        "{", "}", "[", "]", "(", ")", "`", "'",
        // comparison
        "==", "!=", "<", "<=", ">", ">=", "<=>",
        // assignment
        "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
        // increment and decrement
        "++", "--",
        // arithmetic
        "+", "-", "*", "/", "%",
        // bit arithmetic
        "~", "&", "|", "^", "<<", ">>",
        // logical
        "!", "&&", "||",
        // access
        ".", ".*", "->", "->*",
        // digraph angles
        "<:", ":>", "<%", "%>",
        // rest
        "::", ";", ",", ":", "...", "?",
    ])
});

/// Whitespace as classified by C's `isspace` in the default locale.
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\x0B' | b'\x0C' | b'\r')
}

pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

fn is_single_char_operator(c: u8) -> bool {
    if !c.is_ascii() {
        return false;
    }

    let mut buffer = [0u8; 4];
    OPERATORS
        .position((c as char).encode_utf8(&mut buffer))
        .is_some()
}

/// A keyword, stored as its index into [`KEYWORDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keyword(usize);

impl Keyword {
    pub fn from_text(text: &str) -> Option<Self> {
        KEYWORDS.position(text).map(Self)
    }

    pub fn text(self) -> &'static str {
        KEYWORDS.get(self.0)
    }

    /// Whether this keyword names a builtin type (`int`, `unsigned`, ...).
    pub fn is_type(self) -> bool {
        matches!(
            self.text(),
            "auto"
                | "void"
                | "bool"
                | "char"
                | "char8_t"
                | "char16_t"
                | "char32_t"
                | "wchar_t"
                | "double"
                | "float"
                | "int"
                | "__int64"
                | "long"
                | "short"
                | "signed"
                | "unsigned"
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.text())
    }
}

/// An operator or punctuator, stored as its index into [`OPERATORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator(usize);

impl Operator {
    pub fn from_text(text: &str) -> Option<Self> {
        OPERATORS.position(text).map(Self)
    }

    pub fn text(self) -> &'static str {
        OPERATORS.get(self.0)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.text())
    }
}

/// Classification of a [`LexToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    End,
    Space,
    Keyword(Keyword),
    OperatorOrPunctuator(Operator),
    Identifier,
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenClass::End => write!(f, "end of input"),
            TokenClass::Space => write!(f, "space"),
            TokenClass::Keyword(keyword) => write!(f, "keyword {}", keyword),
            TokenClass::OperatorOrPunctuator(op) => write!(f, "operator {}", op),
            TokenClass::Identifier => write!(f, "identifier"),
        }
    }
}

/// A token together with the slice of input it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexToken<'a> {
    pub content: &'a str,
    pub class: TokenClass,
}

impl LexToken<'_> {
    pub fn is_end(&self) -> bool {
        self.class == TokenClass::End
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self.class {
            TokenClass::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<Operator> {
        match self.class {
            TokenClass::OperatorOrPunctuator(op) => Some(op),
            _ => None,
        }
    }
}

/// Single-token lookahead lexer over a demangled name.
pub struct Lexer<'a> {
    text: &'a str,
    next: LexToken<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lexer = Self {
            text,
            next: LexToken {
                content: "",
                class: TokenClass::End,
            },
        };
        lexer.next = lexer.find_next();
        lexer
    }

    /// Consumes and returns the upcoming token. Yields `End` forever once exhausted.
    pub fn next(&mut self) -> LexToken<'a> {
        let upcoming = self.find_next();
        std::mem::replace(&mut self.next, upcoming)
    }

    /// Returns the upcoming token without consuming it.
    pub fn peek(&self) -> &LexToken<'a> {
        &self.next
    }

    fn find_next(&mut self) -> LexToken<'a> {
        loop {
            let Some(&first) = self.text.as_bytes().first() else {
                return LexToken {
                    content: &self.text[self.text.len()..],
                    class: TokenClass::End,
                };
            };

            if !is_space(first) {
                break;
            }

            // Only a single plain space may carry meaning; every other run of
            // whitespace is a mere delimiter.
            let content = self.next_as_space();
            if content == " " {
                return LexToken {
                    content,
                    class: TokenClass::Space,
                };
            }
        }

        if self.text.as_bytes()[0].is_ascii() {
            let options = OPERATORS.prefix_range(&self.text[..1]);
            if !options.is_empty() {
                return self.next_as_op_or_punctuator(options);
            }
        }

        let content = self.next_as_identifier();
        match Keyword::from_text(content) {
            Some(keyword) => LexToken {
                content,
                class: TokenClass::Keyword(keyword),
            },
            None => LexToken {
                content,
                class: TokenClass::Identifier,
            },
        }
    }

    fn next_as_space(&mut self) -> &'a str {
        let bytes = self.text.as_bytes();
        let end = bytes[1..]
            .iter()
            .position(|&c| !is_space(c))
            .map_or(bytes.len(), |pos| pos + 1);

        let (content, rest) = self.text.split_at(end);
        self.text = rest;
        content
    }

    /// Longest-prefix match against [`OPERATORS`].
    fn next_as_op_or_punctuator(&mut self, mut options: Range<usize>) -> LexToken<'a> {
        debug_assert_eq!(OPERATORS.get(options.start), &self.text[..1]);

        let mut length = 1;
        let mut last_match = options.start;
        while let Some(prefix) = self.text.get(..length + 1) {
            let next_options = OPERATORS.prefix_range(prefix);
            if next_options.is_empty() {
                break;
            }

            length += 1;
            options = next_options;

            // The front entry has exactly the prefix length only if it is a full match.
            if OPERATORS.get(options.start).len() == length {
                last_match = options.start;
            }
        }

        let (content, rest) = self.text.split_at(OPERATORS.get(last_match).len());
        self.text = rest;

        LexToken {
            content,
            class: TokenClass::OperatorOrPunctuator(Operator(last_match)),
        }
    }

    fn next_as_identifier(&mut self) -> &'a str {
        let bytes = self.text.as_bytes();
        let end = bytes[1..]
            .iter()
            .position(|&c| is_space(c) || is_single_char_operator(c))
            .map_or(bytes.len(), |pos| pos + 1);

        let (content, rest) = self.text.split_at(end);
        self.text = rest;
        content
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = Lexer::next(self);
        (!token.is_end()).then_some(token)
    }
}
