// ABOUTME: Public embedding surface — parse source, build a root environment, evaluate

pub mod builtins;
pub mod closure;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod parser;
pub mod value;

use std::rc::Rc;

pub use env::Environment;
pub use error::{EvalError, ParseError};
pub use value::Value;

/// A fresh root environment with every built-in operator already bound.
pub fn root_environment() -> Rc<Environment> {
    let env = Environment::root();
    builtins::register_builtins(&env);
    env
}

/// Parses and evaluates every top-level form in `source`, returning the
/// value of the last one (or `Value::Void` if `source` is empty).
pub fn run(source: &str, env: &Rc<Environment>) -> Result<Value, RunError> {
    let forms = parser::parse_all(source, Some(env))?;
    let mut result = Value::Void;
    for form in forms {
        result = eval::eval(form, env)?;
    }
    Ok(result)
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Owns one root `Environment` across a sequence of inputs — what a REPL or
/// a host embedding holds onto so each line sees bindings made by the last
/// one, without re-threading any parser state (macro expansion is parse-time
/// only, so there is nothing else here to carry between calls).
pub struct Evaluator {
    env: Rc<Environment>,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator {
            env: root_environment(),
        }
    }

    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }

    pub fn eval_str(&self, source: &str) -> Result<Value, RunError> {
        run(source, &self.env)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_simple_program() {
        let env = root_environment();
        let result = run("(+ 1 2 3)", &env).unwrap();
        assert_eq!(result, Value::Int(6));
    }

    #[test]
    fn factorial_via_self_recursive_def() {
        let env = root_environment();
        let program = "
            (def (factorial n)
              (if (<= n 1) 1 (* n (factorial (- n 1)))))
            (factorial 5)
        ";
        let result = run(program, &env).unwrap();
        assert_eq!(result, Value::Int(120));
    }

    #[test]
    fn evaluator_keeps_bindings_across_calls() {
        let gel = Evaluator::new();
        gel.eval_str("(def x 1)").unwrap();
        let result = gel.eval_str("(+ x 1)").unwrap();
        assert_eq!(result, Value::Int(2));
    }
}
