// ABOUTME: Declarative argument parsing/coercion shared by several built-ins

use crate::closure::Closure;
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::value::{Array, Hash, Value};
use std::rc::Rc;

/// One parsed-and-coerced parameter, tagged by the format character that
/// produced it.
pub enum Param {
    Raw(Value),
    Value(Value),
    Array(Array),
    Hash(Hash),
    Symbol(Box<str>),
    Str(Rc<str>),
    Int(i64),
    Closure(Rc<Closure>),
}

/// Parses `args` against `format`, one character per argument:
///
/// - `v` raw, unevaluated value
/// - `V` evaluated value, any type
/// - `a` raw value, must already be an Array (unevaluated array literal)
/// - `A` evaluated value, must be an Array
/// - `H` evaluated value, must be a Hash
/// - `s` raw value, must be a Symbol (returns its name, unevaluated)
/// - `S` evaluated value, must be a Str
/// - `I` evaluated value, must be an Int
/// - `C` evaluated value, must be a Closure
///
/// This implementation covers the fixed-arity subset; callers needing the
/// `(XYZ)` nested-destructure or trailing `*` variadic forms parse those
/// arguments themselves (see `binding::parse_params_from_items` for the
/// nested case used by `closure`/`let`/`def`).
pub fn parse_params(
    function: &str,
    format: &str,
    args: &[Value],
    env: &Rc<Environment>,
) -> Result<Vec<Param>, EvalError> {
    let chars: Vec<char> = format.chars().collect();
    if args.len() != chars.len() {
        return Err(EvalError::wrong_arity(function, chars.len().to_string(), args.len()));
    }
    chars
        .iter()
        .zip(args.iter())
        .map(|(format_char, arg)| coerce(function, *format_char, arg, env))
        .collect()
}

fn coerce(function: &str, format_char: char, arg: &Value, env: &Rc<Environment>) -> Result<Param, EvalError> {
    match format_char {
        'v' => Ok(Param::Raw(arg.clone())),
        's' => match arg {
            Value::Symbol(s) => Ok(Param::Symbol(s.name.clone())),
            other => Err(EvalError::type_mismatch(function, "symbol", other)),
        },
        'a' => match arg {
            Value::Array(a) => Ok(Param::Array(a.clone())),
            other => Err(EvalError::type_mismatch(function, "array", other)),
        },
        _ => {
            let evaluated = eval(arg.clone(), env)?;
            match format_char {
                'V' => Ok(Param::Value(evaluated)),
                'A' => match evaluated {
                    Value::Array(a) => Ok(Param::Array(a)),
                    other => Err(EvalError::type_mismatch(function, "array", &other)),
                },
                'H' => match evaluated {
                    Value::Hash(h) => Ok(Param::Hash(h)),
                    other => Err(EvalError::type_mismatch(function, "hash", &other)),
                },
                'S' => match evaluated {
                    Value::Str(s) => Ok(Param::Str(s)),
                    other => Err(EvalError::type_mismatch(function, "string", &other)),
                },
                'I' => match evaluated {
                    Value::Int(n) => Ok(Param::Int(n)),
                    other => Err(EvalError::type_mismatch(function, "int", &other)),
                },
                'C' => match evaluated {
                    Value::Closure(c) => Ok(Param::Closure(c)),
                    other => Err(EvalError::type_mismatch(function, "closure", &other)),
                },
                other_char => Err(EvalError::InvalidArgumentName(other_char.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_arity_and_coerces() {
        let env = Environment::root();
        let args = vec![Value::Int(7), Value::str("hi")];
        let parsed = parse_params("test", "IS", &args, &env).unwrap();
        assert!(matches!(parsed[0], Param::Int(7)));
        assert!(matches!(&parsed[1], Param::Str(s) if &**s == "hi"));
    }

    #[test]
    fn wrong_type_is_a_type_mismatch() {
        let env = Environment::root();
        let args = vec![Value::str("not an int")];
        let err = parse_params("test", "I", &args, &env).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { .. }));
    }

    #[test]
    fn wrong_arity_is_reported() {
        let env = Environment::root();
        let args = vec![Value::Int(1)];
        let err = parse_params("test", "II", &args, &env).unwrap_err();
        assert!(matches!(err, EvalError::WrongArity { .. }));
    }
}
