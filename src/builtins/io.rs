// ABOUTME: print — writes the unquoted display form of each argument

use super::util::eval_all;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use gel_macros::builtin;
use std::rc::Rc;

#[builtin(name = "print", category = "io")]
pub fn print(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let values = eval_all("print", args, env)?;
    let line: String = values.iter().map(|v| v.display()).collect::<Vec<_>>().join(" ");
    println!("{line}");
    Ok(Value::Void)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_evaluates_its_arguments_and_returns_void() {
        let env = Environment::root();
        let result = print(&[Value::Int(1), Value::str("x")], &env).unwrap();
        assert_eq!(result, Value::Void);
    }
}
