// AST definitions for demangled C++ names
//
// Nodes borrow their text from the parsed input and are immutable once the
// parser hands them out. Each node replays itself into a `Visitor` through
// `accept`; the call order is the contract documented in `crate::visitor`.

use crate::visitor::Visitor;

/// Qualifiers of one indirection level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecLayer {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl SpecLayer {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        if self.is_const {
            visitor.add_const();
        }

        if self.is_volatile {
            visitor.add_volatile();
        }
    }
}

/// Trailing reference kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Refness {
    #[default]
    None,
    LValue,
    RValue,
}

/// Qualifier bundle of a type or call signature.
///
/// `layers.len() == pointer count + 1`: the first layer belongs to the base type,
/// every further layer to one `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specs {
    pub layers: Vec<SpecLayer>,
    pub refness: Refness,
    pub is_noexcept: bool,
}

impl Default for Specs {
    fn default() -> Self {
        Self {
            layers: vec![SpecLayer::default()],
            refness: Refness::None,
            is_noexcept: false,
        }
    }
}

impl Specs {
    pub fn has_ptr(&self) -> bool {
        self.layers.len() > 1
    }

    /// True if replaying would not emit a single qualifier.
    pub fn is_empty(&self) -> bool {
        *self == Specs::default()
    }

    /// Innermost layer, the one a following `const`/`volatile` applies to.
    pub fn top_layer_mut(&mut self) -> &mut SpecLayer {
        assert!(!self.layers.is_empty(), "zero spec layers detected");
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        let Some((base, pointers)) = self.layers.split_first() else {
            panic!("zero spec layers detected");
        };

        base.accept(visitor);
        for layer in pointers {
            visitor.add_ptr();
            layer.accept(visitor);
        }

        match self.refness {
            Refness::None => {}
            Refness::LValue => visitor.add_lvalue_ref(),
            Refness::RValue => visitor.add_rvalue_ref(),
        }

        if self.is_noexcept {
            visitor.add_noexcept();
        }
    }
}

/// Ordered list of types, used for template and call arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSequence<'a> {
    pub types: Vec<Type<'a>>,
}

impl<'a> ArgSequence<'a> {
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        let mut types = self.types.iter();
        if let Some(first) = types.next() {
            first.accept(visitor);
            for ty in types {
                visitor.add_arg();
                ty.accept(visitor);
            }
        }
    }

    pub fn accept_as_template_args<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.begin_template_args(self.types.len());
        self.accept(visitor);
        visitor.end_template_args();
    }
}

/// What an `operator` names: a symbol such as `+=` or, for conversion
/// operators, the target type.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorSymbol<'a> {
    Text(&'a str),
    Conversion(Box<Type<'a>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierContent<'a> {
    Name(&'a str),
    Operator(OperatorSymbol<'a>),
}

/// A (possibly templated) name
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier<'a> {
    pub is_builtin: bool,
    pub content: IdentifierContent<'a>,
    pub template_args: Option<ArgSequence<'a>>,
}

impl<'a> Identifier<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            is_builtin: false,
            content: IdentifierContent::Name(name),
            template_args: None,
        }
    }

    pub fn builtin(name: &'a str) -> Self {
        Self {
            is_builtin: true,
            ..Self::new(name)
        }
    }

    pub fn operator(symbol: OperatorSymbol<'a>) -> Self {
        Self {
            is_builtin: false,
            content: IdentifierContent::Operator(symbol),
            template_args: None,
        }
    }

    /// Plain text of a non-operator identifier.
    pub fn name(&self) -> Option<&'a str> {
        match self.content {
            IdentifierContent::Name(name) => Some(name),
            IdentifierContent::Operator(_) => None,
        }
    }

    pub fn is_template(&self) -> bool {
        self.template_args.is_some()
    }

    pub fn is_void(&self) -> bool {
        self.name() == Some("void")
    }

    /// Names starting with `__` are reserved for the implementation; compilers
    /// use them for decorations such as `__cdecl` or `__ptr64`.
    pub fn is_reserved(&self) -> bool {
        self.name().is_some_and(|name| name.starts_with("__"))
    }

    pub fn is_builtin(&self) -> bool {
        self.is_builtin
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match &self.content {
            IdentifierContent::Name(name) => {
                assert!(!name.is_empty(), "empty identifier is not allowed");
                visitor.add_identifier(name);
            }
            IdentifierContent::Operator(symbol) => {
                visitor.begin_operator_identifier();
                match symbol {
                    OperatorSymbol::Text(text) => {
                        assert!(!text.is_empty(), "empty operator symbol is not allowed");
                        visitor.add_identifier(text);
                    }
                    OperatorSymbol::Conversion(ty) => ty.accept(visitor),
                }
                visitor.end_operator_identifier();
            }
        }

        if let Some(args) = &self.template_args {
            args.accept_as_template_args(visitor);
        }
    }
}

/// Call arguments plus the qualifiers trailing them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionContext<'a> {
    pub args: ArgSequence<'a>,
    pub specs: Specs,
}

impl FunctionContext<'_> {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.begin_function_args(self.args.len());
        self.args.accept(visitor);
        visitor.end_function_args();
        self.specs.accept(visitor);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionIdentifier<'a> {
    pub identifier: Identifier<'a>,
    pub context: FunctionContext<'a>,
}

impl FunctionIdentifier<'_> {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.identifier.accept(visitor);
        self.context.accept(visitor);
    }
}

/// One segment of a scope chain
#[derive(Debug, Clone, PartialEq)]
pub enum Scope<'a> {
    Identifier(Identifier<'a>),
    Function(FunctionIdentifier<'a>),
}

/// Non-empty chain of namespace, class or function scopes
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSequence<'a> {
    pub scopes: Vec<Scope<'a>>,
}

impl ScopeSequence<'_> {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        assert!(!self.scopes.is_empty(), "empty scope sequence is not allowed");

        for scope in &self.scopes {
            visitor.begin_scope();
            match scope {
                Scope::Identifier(identifier) => identifier.accept(visitor),
                Scope::Function(function) => {
                    visitor.begin_function();
                    function.accept(visitor);
                    visitor.end_function();
                }
            }
            visitor.end_scope();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegularType<'a> {
    pub scopes: Option<ScopeSequence<'a>>,
    pub identifier: Identifier<'a>,
    pub specs: Specs,
}

impl RegularType<'_> {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.begin_type();

        if let Some(scopes) = &self.scopes {
            scopes.accept(visitor);
        }

        self.identifier.accept(visitor);
        self.specs.accept(visitor);

        visitor.end_type();
    }
}

/// A plain function type such as `void (int)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType<'a> {
    pub return_type: Box<Type<'a>>,
    pub context: FunctionContext<'a>,
}

impl FunctionType<'_> {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.begin_function();

        visitor.begin_return_type();
        self.return_type.accept(visitor);
        visitor.end_return_type();

        self.context.accept(visitor);

        visitor.end_function();
    }
}

/// The parenthesized declarator of a function pointer, e.g. `(foo::*)`.
///
/// Only lives on the parse stack. `nested` holds the inner declarator and its
/// call arguments when the pointed-to function itself returns a function
/// pointer, as in `void (*(*)(float))(int)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionPtr<'a> {
    pub scopes: Option<ScopeSequence<'a>>,
    pub specs: Specs,
    pub nested: Option<NestedFunctionPtr<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedFunctionPtr<'a> {
    pub ptr: Option<Box<FunctionPtr<'a>>>,
    pub context: FunctionContext<'a>,
}

/// A function-pointer type such as `void (foo::*)() const`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionPtrType<'a> {
    pub return_type: Box<Type<'a>>,
    pub scopes: Option<ScopeSequence<'a>>,
    pub specs: Specs,
    pub context: FunctionContext<'a>,
}

impl FunctionPtrType<'_> {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.begin_type();

        visitor.begin_return_type();
        self.return_type.accept(visitor);
        visitor.end_return_type();

        visitor.begin_function_ptr();
        if let Some(scopes) = &self.scopes {
            scopes.accept(visitor);
        }
        self.specs.accept(visitor);
        visitor.end_function_ptr();

        self.context.accept(visitor);

        visitor.end_type();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type<'a> {
    Regular(RegularType<'a>),
    Function(FunctionType<'a>),
    FunctionPtr(FunctionPtrType<'a>),
}

impl<'a> Type<'a> {
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Regular(regular) if regular.identifier.is_void())
    }

    /// The qualifiers a trailing `const`, `&` or `*` attaches to.
    pub fn specs_mut(&mut self) -> &mut Specs {
        match self {
            Type::Regular(regular) => &mut regular.specs,
            Type::Function(function) => &mut function.context.specs,
            Type::FunctionPtr(ptr) => &mut ptr.specs,
        }
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Type::Regular(regular) => regular.accept(visitor),
            Type::Function(function) => function.accept(visitor),
            Type::FunctionPtr(ptr) => ptr.accept(visitor),
        }
    }
}

/// A named function signature, optionally with return type and scopes
#[derive(Debug, Clone, PartialEq)]
pub struct Function<'a> {
    pub return_type: Option<Box<Type<'a>>>,
    pub scopes: Option<ScopeSequence<'a>>,
    pub identifier: FunctionIdentifier<'a>,
}

impl Function<'_> {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.begin_function();

        if let Some(return_type) = &self.return_type {
            visitor.begin_return_type();
            return_type.accept(visitor);
            visitor.end_return_type();
        }

        if let Some(scopes) = &self.scopes {
            scopes.accept(visitor);
        }

        self.identifier.accept(visitor);

        visitor.end_function();
    }
}
