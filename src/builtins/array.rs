// ABOUTME: array, array-append!, array-get, array-set!, array-remove!, array-size

use super::params::{parse_params, Param};
use super::util::{eval_all, resolve_index};
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use gel_macros::builtin;
use std::rc::Rc;

#[builtin(name = "array", category = "array")]
pub fn array(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let items = eval_all("array", args, env)?;
    Ok(Value::array(items))
}

#[builtin(name = "array-append!", category = "array")]
pub fn array_append(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("array-append!", "at least 1", 0));
    }
    let values = eval_all("array-append!", args, env)?;
    let mut iter = values.into_iter();
    let target = match iter.next().unwrap() {
        Value::Array(a) => a,
        other => return Err(EvalError::type_mismatch("array-append!", "array", &other)),
    };
    target.borrow_mut().extend(iter);
    Ok(Value::Array(target))
}

#[builtin(name = "array-get", category = "array")]
pub fn array_get(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("array-get", "AI", args, env)?;
    let (array, index) = match (&parsed[0], &parsed[1]) {
        (Param::Array(a), Param::Int(i)) => (a, *i),
        _ => unreachable!(),
    };
    let items = array.borrow();
    let i = resolve_index("array-get", index, items.len())?;
    Ok(items[i].clone())
}

#[builtin(name = "array-set!", category = "array")]
pub fn array_set(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("array-set!", "AIV", args, env)?;
    let (array, index, value) = match (&parsed[0], &parsed[1], &parsed[2]) {
        (Param::Array(a), Param::Int(i), Param::Value(v)) => (a, *i, v.clone()),
        _ => unreachable!(),
    };
    let mut items = array.borrow_mut();
    let i = resolve_index("array-set!", index, items.len())?;
    items[i] = value.clone();
    Ok(value)
}

#[builtin(name = "array-remove!", category = "array")]
pub fn array_remove(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("array-remove!", "AI", args, env)?;
    let (array, index) = match (&parsed[0], &parsed[1]) {
        (Param::Array(a), Param::Int(i)) => (a, *i),
        _ => unreachable!(),
    };
    let mut items = array.borrow_mut();
    let i = resolve_index("array-remove!", index, items.len())?;
    Ok(items.remove(i))
}

#[builtin(name = "array-size", category = "array")]
pub fn array_size(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("array-size", "A", args, env)?;
    let array = match &parsed[0] {
        Param::Array(a) => a,
        _ => unreachable!(),
    };
    Ok(Value::Int(array.borrow().len() as i64))
}
