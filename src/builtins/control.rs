// ABOUTME: begin, if, cond, case, while, for, break, quote — control forms

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::value::Value;
use gel_macros::builtin;
use std::rc::Rc;

/// Stops evaluating further expressions once the nearest enclosing loop's
/// `running` flag is cleared, so a `break` inside a `begin` body takes
/// effect immediately rather than after the rest of the body has run.
#[builtin(name = "begin", category = "control")]
pub fn begin(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut result = Value::Void;
    for expr in args {
        if !env.is_running() {
            break;
        }
        result = eval(expr.clone(), env)?;
    }
    Ok(result)
}

#[builtin(name = "if", category = "control")]
pub fn if_form(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(EvalError::wrong_arity("if", "2 or 3", args.len()));
    }
    let condition = eval(args[0].clone(), env)?;
    if condition.is_truthy() {
        eval(args[1].clone(), env)
    } else if args.len() == 3 {
        eval(args[2].clone(), env)
    } else {
        Ok(Value::Void)
    }
}

/// `(cond (test expr …) … (else expr …))`.
#[builtin(name = "cond", category = "control")]
pub fn cond(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    for clause in args {
        let items = match clause {
            Value::Array(a) => a.borrow().clone(),
            other => return Err(EvalError::type_mismatch("cond", "array", other)),
        };
        if items.is_empty() {
            return Err(EvalError::InvalidArgumentName("empty cond clause".to_string()));
        }
        let is_else = matches!(&items[0], Value::Symbol(s) if &*s.name == "else");
        let test_value = if is_else {
            None
        } else {
            Some(eval(items[0].clone(), env)?)
        };
        let matched = match &test_value {
            Some(v) => v.is_truthy(),
            None => true,
        };
        if matched {
            let body = &items[1..];
            if body.is_empty() {
                // No body forms: the matched test's own value stands in for
                // the clause's result (an `else` clause has no test value,
                // so it falls back to Void).
                return Ok(test_value.unwrap_or(Value::Void));
            }
            let mut result = Value::Void;
            for expr in body {
                result = eval(expr.clone(), env)?;
            }
            return Ok(result);
        }
    }
    Ok(Value::Void)
}

/// `(case key (vals expr …) … (else expr …))` — equality dispatch against
/// one evaluated key; `vals` may be a single literal or an Array of
/// alternatives.
#[builtin(name = "case", category = "control")]
pub fn case(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("case", "at least 1", args.len()));
    }
    let key = eval(args[0].clone(), env)?;
    for clause in &args[1..] {
        let items = match clause {
            Value::Array(a) => a.borrow().clone(),
            other => return Err(EvalError::type_mismatch("case", "array", other)),
        };
        if items.is_empty() {
            continue;
        }
        let is_else = matches!(&items[0], Value::Symbol(s) if &*s.name == "else");
        let matched = if is_else {
            true
        } else {
            match &items[0] {
                Value::Array(values) => values.borrow().iter().any(|v| *v == key),
                single => *single == key,
            }
        };
        if matched {
            let mut result = Value::Void;
            for expr in &items[1..] {
                result = eval(expr.clone(), env)?;
            }
            return Ok(result);
        }
    }
    Ok(Value::Void)
}

#[builtin(name = "while", category = "control")]
pub fn while_form(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::wrong_arity("while", "at least 1", args.len()));
    }
    let loop_env = Environment::child(env);
    loop_env.set_running(true);
    let mut result = Value::Void;
    let mut ran = false;
    while loop_env.is_running() {
        let condition = eval(args[0].clone(), &loop_env)?;
        if !condition.is_truthy() {
            if !ran {
                result = condition;
            }
            break;
        }
        ran = true;
        for expr in &args[1..] {
            result = eval(expr.clone(), &loop_env)?;
            if !loop_env.is_running() {
                break;
            }
        }
    }
    Ok(result)
}

/// `(for name array body …)` — binds `name` to each element of the
/// evaluated array in turn.
#[builtin(name = "for", category = "control")]
pub fn for_form(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::wrong_arity("for", "at least 2", args.len()));
    }
    let var_name = match &args[0] {
        Value::Symbol(s) => s.name.to_string(),
        other => return Err(EvalError::type_mismatch("for", "symbol", other)),
    };
    let items = match eval(args[1].clone(), env)? {
        Value::Array(a) => a.borrow().clone(),
        other => return Err(EvalError::type_mismatch("for", "array", &other)),
    };

    let loop_env = Environment::child(env);
    loop_env.set_running(true);
    loop_env.bind(&var_name, Value::Void);
    let mut result = Value::Void;
    for item in items {
        if !loop_env.is_running() {
            break;
        }
        loop_env.bind(&var_name, item);
        for expr in &args[2..] {
            result = eval(expr.clone(), &loop_env)?;
            if !loop_env.is_running() {
                break;
            }
        }
    }
    Ok(result)
}

/// Clears the nearest enclosing loop's `running` flag. The loop itself
/// returns the last value it computed before the break (spec.md §8).
#[builtin(name = "break", category = "control")]
pub fn break_form(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::wrong_arity("break", "0", args.len()));
    }
    env.break_loop();
    Ok(Value::Void)
}

#[builtin(name = "quote", category = "control")]
pub fn quote(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::wrong_arity("quote", "1", args.len()));
    }
    Ok(args[0].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::new_symbol;

    #[test]
    fn if_evaluates_the_taken_branch_only() {
        let env = Environment::root();
        let result = if_form(
            &[Value::Bool(true), Value::Int(1), Value::Int(2)],
            &env,
        )
        .unwrap();
        assert_eq!(result, Value::Int(1));
    }

    #[test]
    fn if_without_else_yields_void_on_false() {
        let env = Environment::root();
        let result = if_form(&[Value::Bool(false), Value::Int(1)], &env).unwrap();
        assert_eq!(result, Value::Void);
    }

    #[test]
    fn quote_returns_argument_unevaluated() {
        let env = Environment::root();
        let sym = Value::Symbol(new_symbol("undefined-name"));
        let result = quote(&[sym.clone()], &env).unwrap();
        assert_eq!(result, sym);
    }

    #[test]
    fn break_clears_nearest_running_scope() {
        let root = Environment::root();
        let loop_env = Environment::child(&root);
        loop_env.set_running(true);
        break_form(&[], &loop_env).unwrap();
        assert!(!loop_env.is_running());
    }
}
