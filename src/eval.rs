// ABOUTME: The evaluator — symbol resolution, call-form dispatch, self-evaluating literals

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

/// Evaluates one Value in `env`.
///
/// - A Symbol resolves via its attached Variable if the parser or a
///   closure's close-over rewriting pinned one, otherwise by walking the
///   Environment chain innermost-first.
/// - A non-empty Array is the call form: the first element is evaluated to
///   find a Closure, and the rest are passed to it *unevaluated* — the
///   closure decides what to evaluate (spec.md §4.3).
/// - An empty Array and everything else is self-evaluating.
pub fn eval(value: Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match value {
        Value::Symbol(ref sym) => {
            if let Some(var) = sym.attached.borrow().clone() {
                return Ok(var.borrow().clone());
            }
            match env.lookup(&sym.name) {
                Some(var) => Ok(var.borrow().clone()),
                None => Err(EvalError::UnknownSymbol(sym.name.to_string())),
            }
        }
        Value::Array(ref items) => {
            let (head_expr, args) = {
                let borrowed = items.borrow();
                if borrowed.is_empty() {
                    return Ok(value.clone());
                }
                (borrowed[0].clone(), borrowed[1..].to_vec())
            };
            match eval(head_expr, env)? {
                Value::Closure(closure) => closure.call(&args, env),
                other => Err(EvalError::NotCallable(other.type_name())),
            }
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::new_symbol;

    #[test]
    fn literals_self_evaluate() {
        let env = Environment::root();
        assert_eq!(eval(Value::Int(42), &env).unwrap(), Value::Int(42));
        assert_eq!(eval(Value::Bool(true), &env).unwrap(), Value::Bool(true));
        assert_eq!(eval(Value::str("hi"), &env).unwrap(), Value::str("hi"));
    }

    #[test]
    fn empty_array_self_evaluates() {
        let env = Environment::root();
        let empty = Value::array(vec![]);
        assert_eq!(eval(empty.clone(), &env).unwrap(), empty);
    }

    #[test]
    fn symbol_resolves_through_environment() {
        let env = Environment::root();
        env.define("x", Value::Int(7)).unwrap();
        let result = eval(Value::Symbol(new_symbol("x")), &env).unwrap();
        assert_eq!(result, Value::Int(7));
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let env = Environment::root();
        let err = eval(Value::Symbol(new_symbol("nope")), &env).unwrap_err();
        assert!(matches!(err, EvalError::UnknownSymbol(_)));
    }

    #[test]
    fn calling_a_non_closure_is_an_error() {
        let env = Environment::root();
        let call = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let err = eval(call, &env).unwrap_err();
        assert!(matches!(err, EvalError::NotCallable(_)));
    }

    #[test]
    fn attached_variable_is_used_without_environment_walk() {
        let env = Environment::root();
        let var = env.define("x", Value::Int(1)).unwrap();
        *var.borrow_mut() = Value::Int(5);
        let sym = new_symbol("x");
        *sym.attached.borrow_mut() = Some(var);
        // A fresh, unrelated environment: resolution must come from the
        // attachment, not from walking this environment's chain.
        let other_env = Environment::root();
        let result = eval(Value::Symbol(sym), &other_env).unwrap();
        assert_eq!(result, Value::Int(5));
    }
}
