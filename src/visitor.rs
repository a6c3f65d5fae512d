//! The callback protocol an AST replays itself against
//!
//! Replays are strictly nested: every `begin_*` is matched by its `end_*`
//! before the enclosing bracket closes. A successful parse is bracketed by
//! [`Visitor::begin`] and [`Visitor::end`]; a failed one issues nothing but a
//! single [`Visitor::unrecognized`] call carrying the untouched input.
//!
//! Qualifier leaves are emitted in a fixed order: base-layer `const`/`volatile`,
//! then one `add_ptr` per indirection followed by that layer's qualifiers, then
//! the reference kind, then `noexcept`.

/// Consumer of a replayed name.
///
/// Every method is required, so a visitor that forgets a callback fails to
/// compile instead of silently dropping part of the name.
pub trait Visitor {
    /// Called instead of `begin`/`end` when the input could not be reduced.
    fn unrecognized(&mut self, content: &str);

    fn begin(&mut self);
    fn end(&mut self);

    fn begin_type(&mut self);
    fn end_type(&mut self);

    /// Opens one scope segment. Producers expect a `::` to follow the segment.
    fn begin_scope(&mut self);
    fn end_scope(&mut self);

    fn add_identifier(&mut self, content: &str);
    /// Separates two sibling argument types.
    fn add_arg(&mut self);

    /// Opens a template argument list with exactly `count` type children.
    fn begin_template_args(&mut self, count: usize);
    fn end_template_args(&mut self);

    fn add_const(&mut self);
    fn add_volatile(&mut self);
    fn add_noexcept(&mut self);
    fn add_ptr(&mut self);
    fn add_lvalue_ref(&mut self);
    fn add_rvalue_ref(&mut self);

    fn begin_function(&mut self);
    fn end_function(&mut self);
    fn begin_return_type(&mut self);
    fn end_return_type(&mut self);
    /// Opens a call argument list with exactly `count` type children.
    fn begin_function_args(&mut self, count: usize);
    fn end_function_args(&mut self);

    /// Brackets the `(*)`-like declarator of a function-pointer type.
    fn begin_function_ptr(&mut self);
    fn end_function_ptr(&mut self);

    /// Brackets the symbol of an operator, which is either text or a whole type.
    fn begin_operator_identifier(&mut self);
    fn end_operator_identifier(&mut self);
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn unrecognized(&mut self, content: &str) {
        (**self).unrecognized(content)
    }

    fn begin(&mut self) {
        (**self).begin()
    }

    fn end(&mut self) {
        (**self).end()
    }

    fn begin_type(&mut self) {
        (**self).begin_type()
    }

    fn end_type(&mut self) {
        (**self).end_type()
    }

    fn begin_scope(&mut self) {
        (**self).begin_scope()
    }

    fn end_scope(&mut self) {
        (**self).end_scope()
    }

    fn add_identifier(&mut self, content: &str) {
        (**self).add_identifier(content)
    }

    fn add_arg(&mut self) {
        (**self).add_arg()
    }

    fn begin_template_args(&mut self, count: usize) {
        (**self).begin_template_args(count)
    }

    fn end_template_args(&mut self) {
        (**self).end_template_args()
    }

    fn add_const(&mut self) {
        (**self).add_const()
    }

    fn add_volatile(&mut self) {
        (**self).add_volatile()
    }

    fn add_noexcept(&mut self) {
        (**self).add_noexcept()
    }

    fn add_ptr(&mut self) {
        (**self).add_ptr()
    }

    fn add_lvalue_ref(&mut self) {
        (**self).add_lvalue_ref()
    }

    fn add_rvalue_ref(&mut self) {
        (**self).add_rvalue_ref()
    }

    fn begin_function(&mut self) {
        (**self).begin_function()
    }

    fn end_function(&mut self) {
        (**self).end_function()
    }

    fn begin_return_type(&mut self) {
        (**self).begin_return_type()
    }

    fn end_return_type(&mut self) {
        (**self).end_return_type()
    }

    fn begin_function_args(&mut self, count: usize) {
        (**self).begin_function_args(count)
    }

    fn end_function_args(&mut self) {
        (**self).end_function_args()
    }

    fn begin_function_ptr(&mut self) {
        (**self).begin_function_ptr()
    }

    fn end_function_ptr(&mut self) {
        (**self).end_function_ptr()
    }

    fn begin_operator_identifier(&mut self) {
        (**self).begin_operator_identifier()
    }

    fn end_operator_identifier(&mut self) {
        (**self).end_operator_identifier()
    }
}
