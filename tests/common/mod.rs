// Shared helpers for integration tests

#![allow(dead_code)]

use cpp_name_prettifier::parser::parser::Parser;
use cpp_name_prettifier::Visitor;

/// One visitor callback, as recorded by [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Unrecognized(String),
    Begin,
    End,
    BeginType,
    EndType,
    BeginScope,
    EndScope,
    Identifier(String),
    Arg,
    BeginTemplateArgs(usize),
    EndTemplateArgs,
    Const,
    Volatile,
    Noexcept,
    Ptr,
    LValueRef,
    RValueRef,
    BeginFunction,
    EndFunction,
    BeginReturnType,
    EndReturnType,
    BeginFunctionArgs(usize),
    EndFunctionArgs,
    BeginFunctionPtr,
    EndFunctionPtr,
    BeginOperatorIdentifier,
    EndOperatorIdentifier,
}

/// Visitor that records every callback in order
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

impl Visitor for Recorder {
    fn unrecognized(&mut self, content: &str) {
        self.calls.push(Call::Unrecognized(content.to_string()));
    }

    fn begin(&mut self) {
        self.calls.push(Call::Begin);
    }

    fn end(&mut self) {
        self.calls.push(Call::End);
    }

    fn begin_type(&mut self) {
        self.calls.push(Call::BeginType);
    }

    fn end_type(&mut self) {
        self.calls.push(Call::EndType);
    }

    fn begin_scope(&mut self) {
        self.calls.push(Call::BeginScope);
    }

    fn end_scope(&mut self) {
        self.calls.push(Call::EndScope);
    }

    fn add_identifier(&mut self, content: &str) {
        self.calls.push(Call::Identifier(content.to_string()));
    }

    fn add_arg(&mut self) {
        self.calls.push(Call::Arg);
    }

    fn begin_template_args(&mut self, count: usize) {
        self.calls.push(Call::BeginTemplateArgs(count));
    }

    fn end_template_args(&mut self) {
        self.calls.push(Call::EndTemplateArgs);
    }

    fn add_const(&mut self) {
        self.calls.push(Call::Const);
    }

    fn add_volatile(&mut self) {
        self.calls.push(Call::Volatile);
    }

    fn add_noexcept(&mut self) {
        self.calls.push(Call::Noexcept);
    }

    fn add_ptr(&mut self) {
        self.calls.push(Call::Ptr);
    }

    fn add_lvalue_ref(&mut self) {
        self.calls.push(Call::LValueRef);
    }

    fn add_rvalue_ref(&mut self) {
        self.calls.push(Call::RValueRef);
    }

    fn begin_function(&mut self) {
        self.calls.push(Call::BeginFunction);
    }

    fn end_function(&mut self) {
        self.calls.push(Call::EndFunction);
    }

    fn begin_return_type(&mut self) {
        self.calls.push(Call::BeginReturnType);
    }

    fn end_return_type(&mut self) {
        self.calls.push(Call::EndReturnType);
    }

    fn begin_function_args(&mut self, count: usize) {
        self.calls.push(Call::BeginFunctionArgs(count));
    }

    fn end_function_args(&mut self) {
        self.calls.push(Call::EndFunctionArgs);
    }

    fn begin_function_ptr(&mut self) {
        self.calls.push(Call::BeginFunctionPtr);
    }

    fn end_function_ptr(&mut self) {
        self.calls.push(Call::EndFunctionPtr);
    }

    fn begin_operator_identifier(&mut self) {
        self.calls.push(Call::BeginOperatorIdentifier);
    }

    fn end_operator_identifier(&mut self) {
        self.calls.push(Call::EndOperatorIdentifier);
    }
}

pub fn id(name: &str) -> Call {
    Call::Identifier(name.to_string())
}

/// `begin_type`, the name, `end_type`
pub fn plain_type(name: &str) -> Vec<Call> {
    vec![Call::BeginType, id(name), Call::EndType]
}

/// A scope segment holding a plain identifier
pub fn scope(name: &str) -> Vec<Call> {
    vec![Call::BeginScope, id(name), Call::EndScope]
}

/// Wraps a replay in `begin`/`end`
pub fn root(calls: Vec<Call>) -> Vec<Call> {
    let mut result = vec![Call::Begin];
    result.extend(calls);
    result.push(Call::End);
    result
}

pub fn record_type(input: &str) -> Vec<Call> {
    let mut recorder = Recorder::default();
    Parser::new(input).parse_type().accept(&mut recorder);
    recorder.calls
}

pub fn record_function(input: &str) -> Vec<Call> {
    let mut recorder = Recorder::default();
    Parser::new(input).parse_function().accept(&mut recorder);
    recorder.calls
}
