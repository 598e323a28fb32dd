// ABOUTME: Small helpers shared across builtin categories

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::value::{new_symbol, Value};
use std::rc::Rc;

/// Evaluates every element of `args` in `env`, left to right.
pub fn eval_all(_function: &str, args: &[Value], env: &Rc<Environment>) -> Result<Vec<Value>, EvalError> {
    args.iter().map(|a| eval(a.clone(), env)).collect()
}

/// Wraps an already-evaluated `value` in `(quote value)` so it can be
/// handed back into a Closure's unevaluated-argument protocol (used by
/// `map`/`filter`/`find`/`apply` to re-inject computed Array elements)
/// without the evaluator mistaking a data Array for a call form.
pub fn quote_value(value: Value) -> Value {
    Value::array(vec![Value::Symbol(new_symbol("quote")), value])
}

pub fn resolve_index(function: &str, index: i64, length: usize) -> Result<usize, EvalError> {
    let resolved = if index < 0 { index + length as i64 } else { index };
    if resolved < 0 || resolved as usize >= length {
        return Err(EvalError::IndexOutOfBounds {
            function: function.to_string(),
            index,
            length,
        });
    }
    Ok(resolved as usize)
}
