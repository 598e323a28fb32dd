// ABOUTME: +, -, *, /, % — n-ary left-fold arithmetic with numeric promotion

use super::util::eval_all;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use gel_macros::builtin;
use std::rc::Rc;

fn is_double(v: &Value) -> bool {
    matches!(v, Value::Double(_))
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Double(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Int(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1 } else { 0 }),
        _ => None,
    }
}

fn as_i64_truncating(v: &Value) -> Option<i64> {
    match v {
        Value::Int(n) => Some(*n),
        Value::Double(n) => Some(n.trunc() as i64),
        Value::Bool(b) => Some(if *b { 1 } else { 0 }),
        _ => None,
    }
}

/// Numeric promotion per spec.md §4.2: Int op Int stays Int; any Double
/// operand promotes the result to Double. Booleans are treated as Int.
fn binary_numeric<FI, FD>(
    function: &str,
    a: &Value,
    b: &Value,
    int_op: FI,
    double_op: FD,
) -> Result<Value, EvalError>
where
    FI: Fn(i64, i64) -> Option<i64>,
    FD: Fn(f64, f64) -> f64,
{
    let a_is_num = matches!(a, Value::Int(_) | Value::Double(_) | Value::Bool(_));
    let b_is_num = matches!(b, Value::Int(_) | Value::Double(_) | Value::Bool(_));
    if !a_is_num || !b_is_num {
        return Err(EvalError::incompatible(function, a, b));
    }
    if is_double(a) || is_double(b) {
        Ok(Value::Double(double_op(as_f64(a).unwrap(), as_f64(b).unwrap())))
    } else {
        match int_op(as_i64(a).unwrap(), as_i64(b).unwrap()) {
            Some(result) => Ok(Value::Int(result)),
            None => Err(EvalError::DivisionByZero(function.to_string())),
        }
    }
}

fn combine_add(a: Value, b: Value) -> Result<Value, EvalError> {
    match (&a, &b) {
        (Value::Str(x), Value::Str(y)) => Ok(Value::str(format!("{x}{y}"))),
        (Value::Array(x), Value::Array(y)) => {
            let mut items = x.borrow().clone();
            items.extend(y.borrow().iter().cloned());
            Ok(Value::array(items))
        }
        (Value::Hash(x), Value::Hash(y)) => {
            let mut merged = x.borrow().clone();
            for (k, v) in y.borrow().iter() {
                merged.insert(k.clone(), v.clone());
            }
            Ok(Value::hash(merged))
        }
        _ => binary_numeric("+", &a, &b, |x, y| x.checked_add(y), |x, y| x + y),
    }
}

#[builtin(name = "+", category = "arithmetic")]
pub fn add(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let values = eval_all("+", args, env)?;
    let mut iter = values.into_iter();
    let mut acc = iter.next().unwrap_or(Value::Int(0));
    for v in iter {
        acc = combine_add(acc, v)?;
    }
    Ok(acc)
}

#[builtin(name = "-", category = "arithmetic")]
pub fn sub(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("-", "at least 1", 0));
    }
    let values = eval_all("-", args, env)?;
    let mut iter = values.into_iter();
    let first = iter.next().unwrap();
    if iter.as_slice().is_empty() {
        return binary_numeric("-", &Value::Int(0), &first, |x, y| Some(x - y), |x, y| x - y);
    }
    let mut acc = first;
    for v in iter {
        acc = binary_numeric("-", &acc, &v, |x, y| Some(x - y), |x, y| x - y)?;
    }
    Ok(acc)
}

#[builtin(name = "*", category = "arithmetic")]
pub fn mul(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("*", "at least 1", 0));
    }
    let values = eval_all("*", args, env)?;
    let mut iter = values.into_iter();
    let mut acc = iter.next().unwrap();
    for v in iter {
        acc = binary_numeric("*", &acc, &v, |x, y| x.checked_mul(y), |x, y| x * y)?;
    }
    Ok(acc)
}

#[builtin(name = "/", category = "arithmetic")]
pub fn div(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("/", "at least 1", 0));
    }
    let values = eval_all("/", args, env)?;
    let mut iter = values.into_iter();
    let first = iter.next().unwrap();
    let int_div = |x: i64, y: i64| if y == 0 { None } else { Some(x / y) };
    if iter.as_slice().is_empty() {
        return binary_numeric("/", &Value::Int(1), &first, int_div, |x, y| x / y);
    }
    let mut acc = first;
    for v in iter {
        acc = binary_numeric("/", &acc, &v, int_div, |x, y| x / y)?;
    }
    Ok(acc)
}

fn modulo_pair(a: &Value, b: &Value) -> Result<Value, EvalError> {
    let a_double = is_double(a);
    let b_double = is_double(b);
    let x = as_i64_truncating(a).ok_or_else(|| EvalError::incompatible("%", a, b))?;
    let y = as_i64_truncating(b).ok_or_else(|| EvalError::incompatible("%", a, b))?;
    if y == 0 {
        return Err(EvalError::DivisionByZero("%".to_string()));
    }
    let result = x % y;
    if a_double || b_double {
        Ok(Value::Double(result as f64))
    } else {
        Ok(Value::Int(result))
    }
}

#[builtin(name = "%", category = "arithmetic")]
pub fn modulo(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("%", "at least 1", 0));
    }
    let values = eval_all("%", args, env)?;
    let mut iter = values.into_iter();
    let mut acc = iter.next().unwrap();
    for v in iter {
        acc = modulo_pair(&acc, &v)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_stays_int_when_both_operands_are_int() {
        let env = Environment::root();
        let result = add(&[Value::Int(1), Value::Int(2), Value::Int(3)], &env).unwrap();
        assert_eq!(result, Value::Int(6));
    }

    #[test]
    fn add_promotes_to_double_with_any_double_operand() {
        let env = Environment::root();
        let result = add(&[Value::Double(1.0), Value::Int(2), Value::Int(3)], &env).unwrap();
        assert_eq!(result, Value::Double(6.0));
    }

    #[test]
    fn add_concatenates_strings() {
        let env = Environment::root();
        let result = add(&[Value::str("foo"), Value::str("bar")], &env).unwrap();
        assert_eq!(result, Value::str("foobar"));
    }

    #[test]
    fn sub_with_single_argument_negates() {
        let env = Environment::root();
        let result = sub(&[Value::Int(5)], &env).unwrap();
        assert_eq!(result, Value::Int(-5));
    }

    #[test]
    fn div_by_zero_on_int_is_an_error() {
        let env = Environment::root();
        let err = div(&[Value::Int(1), Value::Int(0)], &env).unwrap_err();
        assert!(matches!(err, EvalError::DivisionByZero(_)));
    }

    #[test]
    fn div_by_zero_on_double_is_infinity_not_an_error() {
        let env = Environment::root();
        let result = div(&[Value::Double(1.0), Value::Double(0.0)], &env).unwrap();
        assert_eq!(result, Value::Double(f64::INFINITY));
    }

    #[test]
    fn modulo_truncates_double_operands() {
        let env = Environment::root();
        let result = modulo(&[Value::Double(7.5), Value::Int(2)], &env).unwrap();
        assert_eq!(result, Value::Double(1.0));
    }
}
