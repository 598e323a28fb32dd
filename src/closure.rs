// ABOUTME: Closures — native host functions and user lambdas, plus close-over rewriting

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::value::{Array, Value};
use std::rc::Rc;

/// A host-supplied function. Modeled as a reference-counted `Fn` rather than
/// a bare function pointer so a host embedder can close over arbitrary
/// state (the Rust-idiomatic equivalent of the C signature's `void
/// *user_data`), while builtins defined with `#[gel_macros::builtin]` still
/// get a plain `fn` coerced into one.
pub type NativeFn = Rc<dyn Fn(&[Value], &Rc<Environment>) -> Result<Value, EvalError>>;

#[derive(Clone)]
pub enum Closure {
    /// A host function. Receives unevaluated argument Values exactly like a
    /// user closure would — it is responsible for evaluating whichever of
    /// its arguments it wants evaluated (spec.md §4.3); this is how special
    /// forms like `if` and `quote` are ordinary closures.
    Native { name: String, func: NativeFn },
    /// A `lambda`-introduced user closure.
    User {
        name: String,
        params: Vec<Box<str>>,
        variadic: Option<Box<str>>,
        env: Rc<Environment>,
        body: Array,
    },
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Closure::Native { name, .. } => f.debug_struct("Native").field("name", name).finish(),
            Closure::User { name, params, .. } => f
                .debug_struct("User")
                .field("name", name)
                .field("params", params)
                .finish(),
        }
    }
}

impl Closure {
    pub fn native(name: impl Into<String>, func: NativeFn) -> Closure {
        Closure::Native {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Closure::Native { name, .. } => name,
            Closure::User { name, .. } => name,
        }
    }

    /// Invokes the closure with unevaluated `args`, evaluated (where a user
    /// closure is concerned) in `caller_env` — the Environment the call
    /// expression itself appears in, never the closure's own captured
    /// Environment (spec.md §4.4 invocation protocol).
    pub fn call(&self, args: &[Value], caller_env: &Rc<Environment>) -> Result<Value, EvalError> {
        match self {
            Closure::Native { func, .. } => func(args, caller_env),
            Closure::User {
                name,
                params,
                variadic,
                env,
                body,
            } => {
                match variadic {
                    None if args.len() != params.len() => {
                        return Err(EvalError::wrong_arity(
                            name,
                            params.len().to_string(),
                            args.len(),
                        ));
                    }
                    Some(_) if args.len() < params.len() => {
                        return Err(EvalError::wrong_arity(
                            name,
                            format!("at least {}", params.len()),
                            args.len(),
                        ));
                    }
                    _ => {}
                }

                let call_env = Environment::child(env);
                for (param, arg) in params.iter().zip(args.iter()) {
                    let value = eval(arg.clone(), caller_env)?;
                    call_env.bind(param, value);
                }
                if let Some(rest_name) = variadic {
                    let mut rest = Vec::with_capacity(args.len() - params.len());
                    for arg in &args[params.len()..] {
                        rest.push(eval(arg.clone(), caller_env)?);
                    }
                    call_env.bind(rest_name, Value::array(rest));
                }

                let mut result = Value::Void;
                for expr in body.borrow().iter() {
                    result = eval(expr.clone(), &call_env)?;
                }
                Ok(result)
            }
        }
    }
}

/// Walks `body` recursively and, for every Symbol whose name is not one of
/// `params` (or the variadic name), pre-binds the Symbol to the Variable
/// cell found by looking its name up in `env` — if one exists there.
///
/// This is what makes `set!` on a captured name visible through the
/// closure after its defining scope would otherwise have gone out of scope
/// (spec.md §4.4, "Close-over rewriting"), and is performed once at closure
/// construction time rather than on every call.
pub fn rewrite_closure_body(body: &Value, params: &[Box<str>], env: &Rc<Environment>) {
    match body {
        Value::Symbol(sym) => {
            if params.iter().any(|p| p.as_ref() == &*sym.name) {
                return;
            }
            if sym.attached.borrow().is_some() {
                return;
            }
            if let Some(var) = env.lookup(&sym.name) {
                *sym.attached.borrow_mut() = Some(var);
            }
        }
        Value::Array(items) => {
            for item in items.borrow().iter() {
                rewrite_closure_body(item, params, env);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::new_symbol;

    #[test]
    fn rewrite_attaches_variable_for_free_symbols() {
        let env = Environment::root();
        let var = env.define("x", Value::Int(1)).unwrap();
        let body = Value::array(vec![Value::Symbol(new_symbol("x"))]);
        rewrite_closure_body(&body, &[], &env);
        if let Value::Array(items) = &body {
            if let Value::Symbol(sym) = &items.borrow()[0] {
                assert!(Rc::ptr_eq(
                    sym.attached.borrow().as_ref().unwrap(),
                    &var
                ));
            } else {
                panic!("expected symbol");
            }
        }
    }

    #[test]
    fn rewrite_skips_parameter_names() {
        let env = Environment::root();
        env.define("x", Value::Int(1)).unwrap();
        let body = Value::Symbol(new_symbol("x"));
        rewrite_closure_body(&body, &[Box::from("x")], &env);
        if let Value::Symbol(sym) = &body {
            assert!(sym.attached.borrow().is_none());
        }
    }
}
