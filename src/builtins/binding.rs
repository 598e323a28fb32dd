// ABOUTME: def, closure, let — the binding forms

use crate::closure::{rewrite_closure_body, Closure};
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::value::Value;
use gel_macros::builtin;
use std::rc::Rc;

/// Parses a flat list of parameter Symbols, with an optional `& rest`
/// trailing variadic marker, as used by `def`'s function sugar,
/// `closure`'s parameter array, and named `let`.
pub fn parse_params_from_items(items: &[Value]) -> Result<(Vec<Box<str>>, Option<Box<str>>), EvalError> {
    let mut params = Vec::new();
    let mut variadic = None;
    let mut i = 0;
    while i < items.len() {
        match &items[i] {
            Value::Symbol(s) if &*s.name == "&" => {
                let rest = items.get(i + 1).ok_or_else(|| {
                    EvalError::InvalidArgumentName("expected a name after '&'".to_string())
                })?;
                match rest {
                    Value::Symbol(s) => variadic = Some(s.name.clone()),
                    other => return Err(EvalError::type_mismatch("def", "symbol", other)),
                }
                break;
            }
            Value::Symbol(s) => params.push(s.name.clone()),
            other => return Err(EvalError::type_mismatch("def", "symbol", other)),
        }
        i += 1;
    }
    Ok((params, variadic))
}

fn make_user_closure(
    name: String,
    params: Vec<Box<str>>,
    variadic: Option<Box<str>>,
    body: Vec<Value>,
    env: &Rc<Environment>,
) -> Value {
    let body_value = Value::array(body);
    rewrite_closure_body(&body_value, &params, env);
    let body_array = match body_value {
        Value::Array(a) => a,
        _ => unreachable!(),
    };
    Value::Closure(Rc::new(Closure::User {
        name,
        params,
        variadic,
        env: Rc::clone(env),
        body: body_array,
    }))
}

/// `(def name value)` or `(def (name param …) body …)` (spec.md §4.5).
#[builtin(name = "def", category = "binding")]
pub fn def(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("def", "at least 2", args.len()));
    }
    match &args[0] {
        Value::Symbol(sym) => {
            if args.len() != 2 {
                return Err(EvalError::wrong_arity("def", "2", args.len()));
            }
            let value = eval(args[1].clone(), env)?;
            env.define(&sym.name, value.clone())?;
            Ok(value)
        }
        Value::Array(signature) => {
            let signature = signature.borrow().clone();
            if signature.is_empty() {
                return Err(EvalError::InvalidArgumentName(
                    "empty function signature".to_string(),
                ));
            }
            let name = match &signature[0] {
                Value::Symbol(s) => s.name.to_string(),
                other => return Err(EvalError::type_mismatch("def", "symbol", other)),
            };
            if args.len() < 2 {
                return Err(EvalError::wrong_arity("def", "at least 2", args.len()));
            }
            let (params, variadic) = parse_params_from_items(&signature[1..])?;
            let body = args[1..].to_vec();
            let closure = make_user_closure(name.clone(), params, variadic, body, env);
            env.define(&name, closure.clone())?;
            Ok(closure)
        }
        other => Err(EvalError::type_mismatch("def", "symbol or array", other)),
    }
}

/// `(closure (param …) body …)` — anonymous lambda.
#[builtin(name = "closure", category = "binding")]
pub fn closure(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("closure", "at least 1", args.len()));
    }
    let param_items = match &args[0] {
        Value::Array(a) => a.borrow().clone(),
        other => return Err(EvalError::type_mismatch("closure", "array", other)),
    };
    let (params, variadic) = parse_params_from_items(&param_items)?;
    let body = args[1..].to_vec();
    Ok(make_user_closure(
        "lambda".to_string(),
        params,
        variadic,
        body,
        env,
    ))
}

/// `(let ((x v) …) body …)` and named `(let NAME ((x v) …) body …)`.
#[builtin(name = "let", category = "binding")]
pub fn let_form(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::wrong_arity("let", "at least 2", args.len()));
    }
    let (name, bindings_idx) = match &args[0] {
        Value::Symbol(s) => (Some(s.name.to_string()), 1),
        Value::Array(_) => (None, 0),
        other => return Err(EvalError::type_mismatch("let", "symbol or array", other)),
    };
    let bindings = match &args[bindings_idx] {
        Value::Array(a) => a.borrow().clone(),
        other => return Err(EvalError::type_mismatch("let", "array", other)),
    };

    let inner = Environment::child(env);
    let mut param_names = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let pair = match binding {
            Value::Array(a) => a.borrow().clone(),
            other => return Err(EvalError::type_mismatch("let", "array", other)),
        };
        if pair.len() != 2 {
            return Err(EvalError::wrong_arity("let", "2", pair.len()));
        }
        let bind_name = match &pair[0] {
            Value::Symbol(s) => s.name.to_string(),
            other => return Err(EvalError::type_mismatch("let", "symbol", other)),
        };
        let value = eval(pair[1].clone(), env)?;
        inner.bind(&bind_name, value);
        param_names.push(bind_name.into_boxed_str());
    }

    let body = args[bindings_idx + 1..].to_vec();
    if let Some(name) = name {
        let loop_closure = make_user_closure(name.clone(), param_names, None, body.clone(), &inner);
        inner.bind(&name, loop_closure);
    }

    let mut result = Value::Void;
    for expr in body {
        result = eval(expr, &inner)?;
    }
    Ok(result)
}
