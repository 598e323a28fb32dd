// ABOUTME: and, or, comparison operators (>, >=, <, <=, =, !=)

use super::util::eval_all;
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::value::Value;
use gel_macros::builtin;
use std::cmp::Ordering;
use std::rc::Rc;

/// Short-circuiting: stops evaluating as soon as one argument is falsy.
#[builtin(name = "and", category = "logic")]
pub fn and(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut result = Value::Bool(true);
    for arg in args {
        result = eval(arg.clone(), env)?;
        if !result.is_truthy() {
            return Ok(result);
        }
    }
    Ok(result)
}

/// Short-circuiting: stops evaluating as soon as one argument is truthy.
#[builtin(name = "or", category = "logic")]
pub fn or(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut result = Value::Bool(false);
    for arg in args {
        result = eval(arg.clone(), env)?;
        if result.is_truthy() {
            return Ok(result);
        }
    }
    Ok(result)
}

fn chained<F>(function: &'static str, args: &[Value], env: &Rc<Environment>, ok: F) -> Result<Value, EvalError>
where
    F: Fn(Ordering) -> bool,
{
    if args.len() < 2 {
        return Err(EvalError::wrong_arity(function, "at least 2", args.len()));
    }
    let values = eval_all(function, args, env)?;
    for pair in values.windows(2) {
        let ordering = pair[0]
            .partial_compare(&pair[1])
            .ok_or_else(|| EvalError::incompatible(function, &pair[0], &pair[1]))?;
        if !ok(ordering) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

#[builtin(name = ">", category = "logic")]
pub fn gt(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    chained(">", args, env, |o| o == Ordering::Greater)
}

#[builtin(name = ">=", category = "logic")]
pub fn ge(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    chained(">=", args, env, |o| o != Ordering::Less)
}

#[builtin(name = "<", category = "logic")]
pub fn lt(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    chained("<", args, env, |o| o == Ordering::Less)
}

#[builtin(name = "<=", category = "logic")]
pub fn le(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    chained("<=", args, env, |o| o != Ordering::Greater)
}

/// Structural equality (spec.md §4.2): hashes and arrays compare by content,
/// mismatched types are simply unequal rather than an error.
#[builtin(name = "=", category = "logic")]
pub fn eq(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::wrong_arity("=", "2", args.len()));
    }
    let values = eval_all("=", args, env)?;
    Ok(Value::Bool(values[0] == values[1]))
}

#[builtin(name = "!=", category = "logic")]
pub fn not_eq(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::wrong_arity("!=", "2", args.len()));
    }
    let values = eval_all("!=", args, env)?;
    Ok(Value::Bool(values[0] != values[1]))
}
