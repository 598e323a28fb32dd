// ABOUTME: range, find, filter, map, zip, apply — array-oriented higher-order built-ins

use super::params::{parse_params, Param};
use super::util::quote_value;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use gel_macros::builtin;
use std::rc::Rc;

/// Inclusive on both ends: `(range 1 4)` yields `(1 2 3 4)`. Counts down if
/// `start > end`.
#[builtin(name = "range", category = "functional")]
pub fn range(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("range", "II", args, env)?;
    let (start, end) = match (&parsed[0], &parsed[1]) {
        (Param::Int(a), Param::Int(b)) => (*a, *b),
        _ => unreachable!(),
    };
    let items = if start <= end {
        (start..=end).map(Value::Int).collect()
    } else {
        (end..=start).rev().map(Value::Int).collect()
    };
    Ok(Value::array(items))
}

#[builtin(name = "find", category = "functional")]
pub fn find(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("find", "CA", args, env)?;
    let (predicate, items) = match (&parsed[0], &parsed[1]) {
        (Param::Closure(c), Param::Array(a)) => (c, a),
        _ => unreachable!(),
    };
    for item in items.borrow().iter() {
        let matched = predicate.call(&[quote_value(item.clone())], env)?;
        if matched.is_truthy() {
            return Ok(item.clone());
        }
    }
    Ok(Value::Void)
}

#[builtin(name = "filter", category = "functional")]
pub fn filter(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("filter", "CA", args, env)?;
    let (predicate, items) = match (&parsed[0], &parsed[1]) {
        (Param::Closure(c), Param::Array(a)) => (c, a),
        _ => unreachable!(),
    };
    let mut kept = Vec::new();
    for item in items.borrow().iter() {
        let matched = predicate.call(&[quote_value(item.clone())], env)?;
        if matched.is_truthy() {
            kept.push(item.clone());
        }
    }
    Ok(Value::array(kept))
}

#[builtin(name = "map", category = "functional")]
pub fn map(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("map", "CA", args, env)?;
    let (function, items) = match (&parsed[0], &parsed[1]) {
        (Param::Closure(c), Param::Array(a)) => (c, a),
        _ => unreachable!(),
    };
    let mut mapped = Vec::with_capacity(items.borrow().len());
    for item in items.borrow().iter() {
        mapped.push(function.call(&[quote_value(item.clone())], env)?);
    }
    Ok(Value::array(mapped))
}

/// Truncates to the shorter of the two arrays.
#[builtin(name = "zip", category = "functional")]
pub fn zip(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("zip", "AA", args, env)?;
    let (left, right) = match (&parsed[0], &parsed[1]) {
        (Param::Array(a), Param::Array(b)) => (a, b),
        _ => unreachable!(),
    };
    let left = left.borrow();
    let right = right.borrow();
    let zipped = left
        .iter()
        .zip(right.iter())
        .map(|(a, b)| Value::array(vec![a.clone(), b.clone()]))
        .collect();
    Ok(Value::array(zipped))
}

#[builtin(name = "apply", category = "functional")]
pub fn apply(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("apply", "CA", args, env)?;
    let (function, items) = match (&parsed[0], &parsed[1]) {
        (Param::Closure(c), Param::Array(a)) => (c, a),
        _ => unreachable!(),
    };
    let call_args: Vec<Value> = items.borrow().iter().cloned().map(quote_value).collect();
    function.call(&call_args, env)
}
