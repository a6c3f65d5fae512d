// End-to-end tests: raw names in, canonical text out

use std::fmt;

use cpp_name_prettifier::{
    function_to_string, prettify_function, prettify_type, prettify_type_with, type_to_string,
    PrintConfig,
};

fn assert_types(cases: &[(&str, &str)]) {
    for (raw, expected) in cases {
        assert_eq!(type_to_string(raw), *expected, "input {:?}", raw);
    }
}

fn assert_functions(cases: &[(&str, &str)]) {
    for (raw, expected) in cases {
        assert_eq!(function_to_string(raw), *expected, "input {:?}", raw);
    }
}

#[test]
fn test_simple_types_are_unchanged() {
    assert_types(&[
        ("int", "int"),
        ("foo", "foo"),
        ("unsigned long long", "unsigned long long"),
        ("foo::bar::baz", "foo::bar::baz"),
    ]);
}

#[test]
fn test_qualifiers_are_printed_east() {
    assert_types(&[
        ("const foo*", "foo const*"),
        ("foo const*", "foo const*"),
        ("volatile foo const&", "foo const volatile&"),
        ("foo* const* volatile&&", "foo* const* volatile&&"),
    ]);
}

#[test]
fn test_msvc_decorations_are_dropped() {
    assert_types(&[
        ("int* __ptr64", "int*"),
        ("int* __ptr64&& __ptr64", "int*&&"),
        ("class foo", "foo"),
        ("struct std::pair<int,int>", "std::pair<...>"),
    ]);
}

#[test]
fn test_template_args_are_elided() {
    assert_types(&[
        ("foo<int, T>", "foo<...>"),
        ("foo<>", "foo<>"),
        ("std::vector<int, std::allocator<int>>", "std::vector<...>"),
        ("std::__cxx11::basic_string<char>", "std::basic_string<...>"),
        (
            "class std::basic_string<char,struct std::char_traits<char>,class std::allocator<char> >",
            "std::basic_string<...>",
        ),
    ]);
}

#[test]
fn test_anonymous_namespaces() {
    assert_types(&[
        ("(anonymous namespace)::foo", "{anon-ns}::foo"),
        ("{anonymous}::foo", "{anon-ns}::foo"),
        ("`anonymous namespace'::foo", "{anon-ns}::foo"),
        ("`anonymous-namespace'::foo", "{anon-ns}::foo"),
    ]);
    assert_functions(&[("void {anonymous}::foo(int)", "void {anon-ns}::foo(...)")]);
}

#[test]
fn test_lambdas() {
    assert_types(&[
        ("{lambda()#1}::my_type", "lambda#1::my_type"),
        ("{lambda(int, float)#2}::my_type", "lambda#2::my_type"),
        ("<lambda_1>::my_type", "lambda#1::my_type"),
        ("'lambda1'::my_type", "lambda1::my_type"),
        ("<lambda()>::my_type", "lambda::my_type"),
    ]);
}

#[test]
fn test_function_local_types() {
    assert_types(&[
        ("foo()::my_type", "foo::my_type"),
        ("`void foo()'::my_type", "foo::my_type"),
        ("outer::foo(int) const::my_type", "outer::foo::my_type"),
        (
            "struct `public: void __cdecl foo::bar(int) __ptr64'::my_type",
            "foo::bar::my_type",
        ),
    ]);
}

#[test]
fn test_function_pointers() {
    assert_types(&[
        ("void (*)()noexcept", "void (*)() noexcept"),
        ("void (__cdecl*)(void)", "void (*)()"),
        ("int (foo::*)(int) const", "int (foo::*)(...) const"),
        ("void (*())()", "void (*)() ()"),
        ("void (*(*())())()", "void (*)() (*)() ()"),
    ]);
}

#[test]
fn test_functions() {
    assert_functions(&[
        ("ret my_function<void>(void)", "ret my_function<...>()"),
        ("const foo& ns::bar(int, char) const noexcept", "foo const& ns::bar(...) const noexcept"),
        ("foo::operator const bar&() const", "foo::operator bar const&() const"),
        ("foo::~foo()", "foo::foo()"),
        (
            "struct std::source_location __cdecl <lambda_11>::operator ()(void) const",
            "std::source_location lambda#11::operator ()() const",
        ),
    ]);
}

#[test]
fn test_function_template_details_are_removed() {
    assert_functions(&[
        ("void foo<T>::bar() [with T = int]", "void foo::bar()"),
        ("void foo() [T = int]", "void foo()"),
    ]);
}

#[test]
fn test_stacktrace_entry() {
    assert_types(&[("executable!foo+0x1337", "foo")]);
    assert_functions(&[("executable!foo+0x1337", "foo")]);
}

#[test]
fn test_unrecognized_is_verbatim() {
    assert_types(&[("Hello, World!", "Hello, World!")]);
    assert_functions(&[("Hello, World!", "Hello, World!")]);
}

#[test]
fn test_borrowed_sink() {
    let mut out = String::from("> ");
    prettify_type(&mut out, "const foo&").unwrap();
    assert_eq!(out, "> foo const&");

    let out = prettify_function(String::new(), "void foo(int)").unwrap();
    assert_eq!(out, "void foo(...)");
}

#[test]
fn test_custom_config() {
    let config = PrintConfig::empty().with_alias("std", "s");

    let out = prettify_type_with(String::new(), "std::__1::vector<int>", &config).unwrap();
    assert_eq!(out, "s::__1::vector<...>");

    let config = config.with_ignored("__1");
    let out = prettify_type_with(String::new(), "std::__1::vector<int>", &config).unwrap();
    assert_eq!(out, "s::vector<...>");
}

struct FailingSink;

impl fmt::Write for FailingSink {
    fn write_str(&mut self, _: &str) -> fmt::Result {
        Err(fmt::Error)
    }
}

#[test]
fn test_sink_error_is_reported() {
    assert!(prettify_type(FailingSink, "foo").is_err());
    assert!(prettify_function(FailingSink, "Hello, World!").is_err());
}
