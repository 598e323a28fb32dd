//! Procedural macro for registering gel native closures.
//!
//! Provides the `#[builtin(name = "...", category = "...")]` attribute,
//! which wraps a plain Rust function in a `register_<fn>` helper that binds
//! it into an `Environment` as a `Value::Closure`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Parses `name = "...", category = "..."` out of the attribute's token
/// stream. Deliberately simple string scanning rather than a full `syn`
/// parser — the attribute's shape never varies.
fn parse_builtin_args(attr_stream: TokenStream) -> (String, String) {
    let attr_str = attr_stream.to_string();
    let mut name = String::new();
    let mut category = String::new();

    if let Some(start) = attr_str.find("name") {
        let rest = &attr_str[start..];
        if let Some(quote_start) = rest.find('"') {
            let rest = &rest[quote_start + 1..];
            if let Some(end) = rest.find('"') {
                name = rest[..end].to_string();
            }
        }
    }

    if let Some(start) = attr_str.find("category") {
        let rest = &attr_str[start..];
        if let Some(quote_start) = rest.find('"') {
            let rest = &rest[quote_start + 1..];
            if let Some(end) = rest.find('"') {
                category = rest[..end].to_string();
            }
        }
    }

    (name, category)
}

/// Wraps a native closure implementation with a `register_<fn>` function.
///
/// The annotated function must have the signature
/// `fn(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError>`.
/// The generated `register_<fn>(env: &Rc<Environment>)` binds it under
/// `name` in `env`, overwriting any existing binding — used once, at
/// interpreter startup, to populate the root environment.
#[proc_macro_attribute]
pub fn builtin(attr: TokenStream, item: TokenStream) -> TokenStream {
    let func = parse_macro_input!(item as ItemFn);
    let (lisp_name, _category) = parse_builtin_args(attr);

    let fn_name = func.sig.ident.clone();
    let name_to_use = if lisp_name.is_empty() {
        fn_name.to_string()
    } else {
        lisp_name
    };
    let register_fn_name = quote::format_ident!("register_{}", fn_name);

    let expanded = quote! {
        #func

        #[allow(dead_code)]
        pub fn #register_fn_name(env: &::std::rc::Rc<crate::env::Environment>) {
            env.bind(
                #name_to_use,
                crate::value::Value::Closure(::std::rc::Rc::new(
                    crate::closure::Closure::native(#name_to_use, ::std::rc::Rc::new(#fn_name)),
                )),
            );
        }
    };

    TokenStream::from(expanded)
}
