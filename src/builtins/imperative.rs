// ABOUTME: set! and get& — mutation and first-class Variable access

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::value::Value;
use gel_macros::builtin;
use std::rc::Rc;

#[builtin(name = "set!", category = "imperative")]
pub fn set_bang(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::wrong_arity("set!", "2", args.len()));
    }
    let name = match &args[0] {
        Value::Symbol(s) => s.name.to_string(),
        other => return Err(EvalError::type_mismatch("set!", "symbol", other)),
    };
    let value = eval(args[1].clone(), env)?;
    env.set(&name, value.clone())?;
    Ok(value)
}

#[builtin(name = "get&", category = "imperative")]
pub fn get_variable(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::wrong_arity("get&", "1", args.len()));
    }
    let name = match &args[0] {
        Value::Symbol(s) => s.name.to_string(),
        other => return Err(EvalError::type_mismatch("get&", "symbol", other)),
    };
    let var = env
        .lookup(&name)
        .ok_or_else(|| EvalError::UnknownSymbol(name.clone()))?;
    Ok(Value::Variable(var))
}
