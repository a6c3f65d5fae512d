//! Parse stack and the reduction rules operating on it
//!
//! The parser shifts one [`StackToken`] per lexer token and then applies some of
//! the rules below. Every rule only inspects the tail of the stack: it either
//! collapses a matching suffix into a single richer token and returns `true`, or
//! leaves the stack untouched and returns `false`.
//!
//! The shapes are written top-of-stack last, `?` marks optional tokens:
//!
//! | rule                     | shape                                                              |
//! |--------------------------|--------------------------------------------------------------------|
//! | scope sequence           | `(Identifier \| FunctionIdentifier) ::`                            |
//! | arg sequence             | `ArgSequence , Type` or `Type`                                     |
//! | template identifier      | `Identifier < ArgSequence? >`                                      |
//! | function context         | `( ArgSequence? )`                                                 |
//! | function pointer         | `( __reserved? ScopeSequence? Specs (FunctionPtr? FunctionContext)? )` |
//! | function identifier      | `Identifier FunctionContext __reserved? Space?`                    |
//! | function                 | `Type? Space? ScopeSequence? FunctionIdentifier`                   |
//! | regular type             | `(Specs \| TypeContext)* Space? ScopeSequence? Identifier`         |
//! | function type            | `Type Space? __reserved? FunctionContext`                          |
//! | function-pointer type    | `Type Space? FunctionPtr FunctionContext`                          |
//! | placeholder              | `open ... close` with at least one token in between                |

use super::ast::{
    ArgSequence, Function, FunctionContext, FunctionIdentifier, FunctionPtr, FunctionPtrType,
    FunctionType, Identifier, NestedFunctionPtr, OperatorSymbol, Refness, RegularType, Scope,
    ScopeSequence, SpecLayer, Specs, Type,
};
use std::fmt;

/// Element of the parse stack: either a bare marker or a (partially) reduced node.
#[derive(Debug, Clone, PartialEq)]
pub enum StackToken<'a> {
    Space,
    OperatorKeyword,
    ScopeResolution(&'a str),
    ArgSeparator(&'a str),
    OpeningAngle(&'a str),
    ClosingAngle(&'a str),
    OpeningParens(&'a str),
    ClosingParens(&'a str),
    OpeningCurly(&'a str),
    ClosingCurly(&'a str),
    OpeningBacktick(&'a str),
    ClosingSingleQuote(&'a str),
    /// `class`, `struct` or `enum`
    TypeContext(&'a str),

    Identifier(Identifier<'a>),
    FunctionIdentifier(FunctionIdentifier<'a>),
    ScopeSequence(ScopeSequence<'a>),
    ArgSequence(ArgSequence<'a>),
    FunctionContext(FunctionContext<'a>),
    FunctionPtr(FunctionPtr<'a>),
    Specs(Specs),
    Type(Type<'a>),
    Function(Function<'a>),
}

impl StackToken<'_> {
    fn is_space(&self) -> bool {
        matches!(self, StackToken::Space)
    }

    /// A plain `__`-prefixed name such as `__cdecl` or `__ptr64`.
    fn is_reserved_identifier(&self) -> bool {
        matches!(
            self,
            StackToken::Identifier(id) if id.is_reserved() && !id.is_builtin() && !id.is_template()
        )
    }

    fn name(&self) -> &'static str {
        match self {
            StackToken::Space => "Space",
            StackToken::OperatorKeyword => "OperatorKeyword",
            StackToken::ScopeResolution(_) => "ScopeResolution",
            StackToken::ArgSeparator(_) => "ArgSeparator",
            StackToken::OpeningAngle(_) => "OpeningAngle",
            StackToken::ClosingAngle(_) => "ClosingAngle",
            StackToken::OpeningParens(_) => "OpeningParens",
            StackToken::ClosingParens(_) => "ClosingParens",
            StackToken::OpeningCurly(_) => "OpeningCurly",
            StackToken::ClosingCurly(_) => "ClosingCurly",
            StackToken::OpeningBacktick(_) => "OpeningBacktick",
            StackToken::ClosingSingleQuote(_) => "ClosingSingleQuote",
            StackToken::TypeContext(_) => "TypeContext",
            StackToken::Identifier(_) => "Identifier",
            StackToken::FunctionIdentifier(_) => "FunctionIdentifier",
            StackToken::ScopeSequence(_) => "ScopeSequence",
            StackToken::ArgSequence(_) => "ArgSequence",
            StackToken::FunctionContext(_) => "FunctionContext",
            StackToken::FunctionPtr(_) => "FunctionPtr",
            StackToken::Specs(_) => "Specs",
            StackToken::Type(_) => "Type",
            StackToken::Function(_) => "Function",
        }
    }
}

impl fmt::Display for StackToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type TokenStack<'a> = Vec<StackToken<'a>>;

/// Compact `[A, B, C]` rendering of the stack for trace logs.
pub struct StackSummary<'s, 'a>(pub &'s [StackToken<'a>]);

impl fmt::Display for StackSummary<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", token)?;
        }
        f.write_str("]")
    }
}

/// Pops the top token, which the caller has already verified to be `$variant`.
macro_rules! pop_expect {
    ($stack:expr, $variant:ident) => {
        match $stack.pop() {
            Some(StackToken::$variant(inner)) => inner,
            other => panic!(
                concat!("expected ", stringify!($variant), " on top of the stack, found {:?}"),
                other
            ),
        }
    };
}

/// Bracket kinds a placeholder can be wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Angle,
    Parens,
    Curly,
    Backtick,
    SingleQuote,
}

impl Delimiter {
    fn opening<'a>(self, token: &StackToken<'a>) -> Option<&'a str> {
        match (self, token) {
            (Delimiter::Angle, StackToken::OpeningAngle(content))
            | (Delimiter::Parens, StackToken::OpeningParens(content))
            | (Delimiter::Curly, StackToken::OpeningCurly(content))
            | (Delimiter::Backtick, StackToken::OpeningBacktick(content))
            | (Delimiter::SingleQuote, StackToken::ClosingSingleQuote(content)) => Some(*content),
            _ => None,
        }
    }

    fn closing<'a>(self, token: &StackToken<'a>) -> Option<&'a str> {
        match (self, token) {
            (Delimiter::Angle, StackToken::ClosingAngle(content))
            | (Delimiter::Parens, StackToken::ClosingParens(content))
            | (Delimiter::Curly, StackToken::ClosingCurly(content))
            | (Delimiter::SingleQuote, StackToken::ClosingSingleQuote(content)) => Some(*content),
            _ => None,
        }
    }
}

/// Returns the slice of `source` reaching from the start of `first` to the end of `last`.
///
/// Both arguments must be sub-slices of `source`, with `first` not behind `last`.
pub fn span<'a>(source: &'a str, first: &'a str, last: &'a str) -> &'a str {
    let base = source.as_ptr() as usize;
    let start = first.as_ptr() as usize;
    let end = last.as_ptr() as usize + last.len();
    assert!(
        base <= start && start <= end && end <= base + source.len(),
        "token content is not part of the parsed source"
    );

    &source[start - base..end - base]
}

pub fn try_reduce_as_scope_sequence(stack: &mut TokenStack<'_>) -> bool {
    if !matches!(
        stack.as_slice(),
        [.., StackToken::Identifier(_) | StackToken::FunctionIdentifier(_), StackToken::ScopeResolution(_)]
    ) {
        return false;
    }

    stack.pop();
    let scope = match stack.pop() {
        Some(StackToken::Identifier(identifier)) => Scope::Identifier(identifier),
        Some(StackToken::FunctionIdentifier(function)) => Scope::Function(function),
        other => panic!("expected a scope on top of the stack, found {:?}", other),
    };

    if let Some(StackToken::ScopeSequence(sequence)) = stack.last_mut() {
        sequence.scopes.push(scope);
    } else {
        stack.push(StackToken::ScopeSequence(ScopeSequence {
            scopes: vec![scope],
        }));
    }

    true
}

pub fn try_reduce_as_arg_sequence(stack: &mut TokenStack<'_>) -> bool {
    match stack.as_slice() {
        [.., StackToken::ArgSequence(_), StackToken::ArgSeparator(_), StackToken::Type(_)] => {
            let ty = pop_expect!(stack, Type);
            stack.pop();
            if let Some(StackToken::ArgSequence(sequence)) = stack.last_mut() {
                sequence.types.push(ty);
            }
            true
        }
        [.., StackToken::Type(_)] => {
            let ty = pop_expect!(stack, Type);
            stack.push(StackToken::ArgSequence(ArgSequence { types: vec![ty] }));
            true
        }
        _ => false,
    }
}

pub fn try_reduce_as_template_identifier(stack: &mut TokenStack<'_>) -> bool {
    let has_args = match stack.as_slice() {
        [.., StackToken::Identifier(id), StackToken::OpeningAngle(_), StackToken::ArgSequence(_), StackToken::ClosingAngle(_)]
            if !id.is_template() =>
        {
            true
        }
        [.., StackToken::Identifier(id), StackToken::OpeningAngle(_), StackToken::ClosingAngle(_)]
            if !id.is_template() =>
        {
            false
        }
        _ => return false,
    };

    stack.pop();
    let args = if has_args {
        pop_expect!(stack, ArgSequence)
    } else {
        ArgSequence::default()
    };
    stack.pop();

    if let Some(StackToken::Identifier(identifier)) = stack.last_mut() {
        identifier.template_args = Some(args);
    }

    true
}

/// Collapses `open ... close` into a single identifier spanning the raw text,
/// e.g. `{anonymous}`, `<lambda_1>` or `` `anonymous namespace' ``.
pub fn try_reduce_as_placeholder_identifier_wrapped<'a>(
    stack: &mut TokenStack<'a>,
    source: &'a str,
    open: Delimiter,
    close: Delimiter,
) -> bool {
    let Some(closing) = stack.last().and_then(|token| close.closing(token)) else {
        return false;
    };

    let close_index = stack.len() - 1;
    let Some((open_index, opening)) = stack[..close_index]
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, token)| open.opening(token).map(|content| (index, content)))
    else {
        return false;
    };

    // Empty brackets such as `<>` or `()` carry structure, not a placeholder.
    if close_index - open_index < 2 {
        return false;
    }

    stack.truncate(open_index);
    stack.push(StackToken::Identifier(Identifier::new(span(
        source, opening, closing,
    ))));

    true
}

pub fn try_reduce_as_function_context(stack: &mut TokenStack<'_>) -> bool {
    let open_index = match stack.as_slice() {
        [.., StackToken::OpeningParens(_), StackToken::ArgSequence(_), StackToken::ClosingParens(_)] => {
            stack.len() - 3
        }
        [.., StackToken::OpeningParens(_), StackToken::ClosingParens(_)] => stack.len() - 2,
        _ => return false,
    };

    // A call signature never directly follows a scope; `foo::(anon)` is a placeholder.
    if open_index > 0
        && matches!(
            stack[open_index - 1],
            StackToken::ScopeResolution(_) | StackToken::ScopeSequence(_)
        )
    {
        return false;
    }

    let mut args = ArgSequence::default();
    for token in stack.drain(open_index..) {
        if let StackToken::ArgSequence(sequence) = token {
            args = sequence;
        }
    }

    // `(void)` declares an empty argument list.
    if args.types.len() == 1 && args.types[0].is_void() {
        args.types.clear();
    }

    stack.push(StackToken::FunctionContext(FunctionContext {
        args,
        specs: Specs::default(),
    }));

    true
}

pub fn try_reduce_as_function_ptr(stack: &mut TokenStack<'_>) -> bool {
    if !matches!(stack.last(), Some(StackToken::ClosingParens(_))) {
        return false;
    }

    let mut index = stack.len() - 1;
    if index > 0 && matches!(stack[index - 1], StackToken::FunctionContext(_)) {
        index -= 1;
        if index > 0 && matches!(stack[index - 1], StackToken::FunctionPtr(_)) {
            index -= 1;
        }
    }

    let is_declarator_specs = |token: &StackToken<'_>| {
        matches!(
            token,
            StackToken::Specs(specs) if specs.has_ptr() || specs.refness != Refness::None
        )
    };
    if index == 0 || !is_declarator_specs(&stack[index - 1]) {
        return false;
    }
    index -= 1;

    if index > 0 && matches!(stack[index - 1], StackToken::ScopeSequence(_)) {
        index -= 1;
    }

    // Calling conventions, e.g. `(__cdecl foo::*)`.
    if index > 0 && stack[index - 1].is_reserved_identifier() {
        index -= 1;
    }

    if index == 0 || !matches!(stack[index - 1], StackToken::OpeningParens(_)) {
        return false;
    }

    let mut ptr = FunctionPtr {
        scopes: None,
        specs: Specs::default(),
        nested: None,
    };
    let mut nested_ptr = None;
    for token in stack.drain(index - 1..) {
        match token {
            StackToken::ScopeSequence(scopes) => ptr.scopes = Some(scopes),
            StackToken::Specs(specs) => ptr.specs = specs,
            StackToken::FunctionPtr(inner) => nested_ptr = Some(Box::new(inner)),
            StackToken::FunctionContext(context) => {
                ptr.nested = Some(NestedFunctionPtr {
                    ptr: nested_ptr.take(),
                    context,
                });
            }
            _ => {}
        }
    }

    stack.push(StackToken::FunctionPtr(ptr));

    true
}

/// `Identifier FunctionContext` becomes a `FunctionIdentifier`. Trailing msvc
/// decorations such as `__ptr64` and a dangling space are discarded on success.
pub fn try_reduce_as_function_identifier(stack: &mut TokenStack<'_>) -> bool {
    let mut end = stack.len();
    if end > 0 && stack[end - 1].is_space() {
        end -= 1;
    }

    if end > 0 && stack[end - 1].is_reserved_identifier() {
        end -= 1;
        if end > 0 && stack[end - 1].is_space() {
            end -= 1;
        }
    }

    if !matches!(
        stack[..end],
        [.., StackToken::Identifier(_), StackToken::FunctionContext(_)]
    ) {
        return false;
    }

    stack.truncate(end);
    let context = pop_expect!(stack, FunctionContext);
    let identifier = pop_expect!(stack, Identifier);
    stack.push(StackToken::FunctionIdentifier(FunctionIdentifier {
        identifier,
        context,
    }));

    true
}

/// Turns `operator <type> FunctionContext` into a function identifier whose
/// operator symbol is the target type.
pub fn reduce_as_conversion_operator_function_identifier(stack: &mut TokenStack<'_>) -> bool {
    if !matches!(stack.last(), Some(StackToken::FunctionContext(_))) {
        return false;
    }

    let context = pop_expect!(stack, FunctionContext);
    let has_type = matches!(stack.last(), Some(StackToken::Type(_))) || try_reduce_as_type(stack);
    if !has_type
        || !matches!(
            stack.as_slice(),
            [.., StackToken::OperatorKeyword, StackToken::Type(_)]
        )
    {
        stack.push(StackToken::FunctionContext(context));
        return false;
    }

    let target = pop_expect!(stack, Type);
    stack.pop();
    stack.push(StackToken::FunctionIdentifier(FunctionIdentifier {
        identifier: Identifier::operator(OperatorSymbol::Conversion(Box::new(target))),
        context,
    }));

    true
}

pub fn try_reduce_as_function(stack: &mut TokenStack<'_>) -> bool {
    if !matches!(stack.last(), Some(StackToken::FunctionIdentifier(_))) {
        return false;
    }

    let mut start = stack.len() - 1;
    if start > 0 && matches!(stack[start - 1], StackToken::ScopeSequence(_)) {
        start -= 1;
    }
    if start > 0 && stack[start - 1].is_space() {
        start -= 1;
    }
    if start > 0 && matches!(stack[start - 1], StackToken::Type(_)) {
        start -= 1;
    }

    let mut return_type = None;
    let mut scopes = None;
    let mut identifier = None;
    for token in stack.drain(start..) {
        match token {
            StackToken::Type(ty) => return_type = Some(Box::new(ty)),
            StackToken::ScopeSequence(sequence) => scopes = Some(sequence),
            StackToken::FunctionIdentifier(function) => identifier = Some(function),
            _ => {}
        }
    }

    let Some(identifier) = identifier else {
        panic!("function reduction lost its identifier");
    };
    stack.push(StackToken::Function(Function {
        return_type,
        scopes,
        identifier,
    }));

    true
}

/// Prefix qualifiers (`const foo`) only ever touch the base layer.
fn is_prefix_specs(token: &StackToken<'_>) -> bool {
    matches!(
        token,
        StackToken::Specs(specs) if !specs.has_ptr() && specs.refness == Refness::None
    )
}

pub fn try_reduce_as_regular_type(stack: &mut TokenStack<'_>) -> bool {
    let Some(StackToken::Identifier(identifier)) = stack.last() else {
        return false;
    };

    let id_index = stack.len() - 1;
    let is_decoration = identifier.is_reserved()
        && !identifier.is_builtin()
        && !identifier.is_template()
        && !(id_index > 0 && matches!(stack[id_index - 1], StackToken::ScopeSequence(_)));

    if is_decoration && id_index > 0 {
        match stack[id_index - 1] {
            // `int* __ptr64`, `void __cdecl`: the decoration just goes away.
            StackToken::Type(_) => {
                stack.pop();
                return true;
            }
            // `foo() __ptr64` and `(__cdecl*)` are resolved by other rules.
            StackToken::FunctionContext(_) | StackToken::OpeningParens(_) => return false,
            _ => {}
        }
    }

    let mut start = id_index;
    if start > 0 && matches!(stack[start - 1], StackToken::ScopeSequence(_)) {
        start -= 1;
    }

    let is_prefix = |token: &StackToken<'_>| {
        is_prefix_specs(token) || matches!(token, StackToken::TypeContext(_))
    };
    if start > 1 && stack[start - 1].is_space() && is_prefix(&stack[start - 2]) {
        start -= 1;
    }
    while start > 0 && is_prefix(&stack[start - 1]) {
        start -= 1;
    }

    let identifier = pop_expect!(stack, Identifier);
    let mut base = SpecLayer::default();
    let mut scopes = None;
    for token in stack.drain(start..) {
        match token {
            StackToken::Specs(specs) => {
                base.is_const |= specs.layers[0].is_const;
                base.is_volatile |= specs.layers[0].is_volatile;
            }
            StackToken::ScopeSequence(sequence) => scopes = Some(sequence),
            _ => {}
        }
    }

    let mut specs = Specs::default();
    specs.layers[0] = base;
    stack.push(StackToken::Type(Type::Regular(RegularType {
        scopes,
        identifier,
        specs,
    })));

    true
}

pub fn try_reduce_as_function_type(stack: &mut TokenStack<'_>) -> bool {
    if !matches!(stack.last(), Some(StackToken::FunctionContext(_))) {
        return false;
    }

    let mut index = stack.len() - 1;
    if index > 0 && stack[index - 1].is_reserved_identifier() {
        index -= 1;
    }
    if index > 0 && stack[index - 1].is_space() {
        index -= 1;
    }
    if index == 0 || !matches!(stack[index - 1], StackToken::Type(_)) {
        return false;
    }

    let context = pop_expect!(stack, FunctionContext);
    let mut return_type = None;
    for token in stack.drain(index - 1..) {
        if let StackToken::Type(ty) = token {
            return_type = Some(ty);
        }
    }

    let Some(return_type) = return_type else {
        panic!("return type is mandatory for function types");
    };
    stack.push(StackToken::Type(Type::Function(FunctionType {
        return_type: Box::new(return_type),
        context,
    })));

    true
}

/// Builds the type a (possibly nested) function-pointer declarator describes.
///
/// For `R (*(*)(A))(B)` the outer declarator applies to `R (B)` first; the result
/// then becomes the return type of the nested declarator with its own arguments.
fn unroll_function_ptr<'a>(
    return_type: Type<'a>,
    ptr: FunctionPtr<'a>,
    context: FunctionContext<'a>,
) -> Type<'a> {
    let FunctionPtr {
        scopes,
        specs,
        nested,
    } = ptr;
    let ty = Type::FunctionPtr(FunctionPtrType {
        return_type: Box::new(return_type),
        scopes,
        specs,
        context,
    });

    match nested {
        None => ty,
        Some(NestedFunctionPtr {
            ptr: Some(inner),
            context,
        }) => unroll_function_ptr(ty, *inner, context),
        Some(NestedFunctionPtr { ptr: None, context }) => Type::Function(FunctionType {
            return_type: Box::new(ty),
            context,
        }),
    }
}

pub fn try_reduce_as_function_ptr_type(stack: &mut TokenStack<'_>) -> bool {
    let start = match stack.as_slice() {
        [.., StackToken::Type(_), StackToken::Space, StackToken::FunctionPtr(_), StackToken::FunctionContext(_)] => {
            stack.len() - 4
        }
        [.., StackToken::Type(_), StackToken::FunctionPtr(_), StackToken::FunctionContext(_)] => {
            stack.len() - 3
        }
        _ => return false,
    };

    let context = pop_expect!(stack, FunctionContext);
    let ptr = pop_expect!(stack, FunctionPtr);
    let mut return_type = None;
    for token in stack.drain(start..) {
        if let StackToken::Type(ty) = token {
            return_type = Some(ty);
        }
    }

    let Some(return_type) = return_type else {
        panic!("return type is mandatory for function pointers");
    };
    stack.push(StackToken::Type(unroll_function_ptr(return_type, ptr, context)));

    true
}

pub fn try_reduce_as_type(stack: &mut TokenStack<'_>) -> bool {
    try_reduce_as_function_ptr_type(stack)
        || try_reduce_as_function_type(stack)
        || try_reduce_as_regular_type(stack)
}

/// Returns the qualifiers the next `const`, `volatile`, `noexcept`, `&` or `*`
/// applies to, creating a fresh [`Specs`] token if nothing on top can take them.
pub fn get_or_emplace_specs<'s>(stack: &'s mut TokenStack<'_>) -> &'s mut Specs {
    // Something like `foo const`: the identifier is complete now.
    if matches!(stack.last(), Some(StackToken::Identifier(_))) && !try_reduce_as_type(stack) {
        // Only decorations like `__ptr64` refuse to become a type.
        stack.pop();
    }

    if !matches!(
        stack.last(),
        Some(StackToken::Type(_) | StackToken::FunctionContext(_) | StackToken::Specs(_))
    ) {
        stack.push(StackToken::Specs(Specs::default()));
    }

    match stack.last_mut() {
        Some(StackToken::Type(ty)) => ty.specs_mut(),
        Some(StackToken::FunctionContext(context)) => &mut context.specs,
        Some(StackToken::Specs(specs)) => specs,
        _ => unreachable!("a specs holder was just ensured"),
    }
}
