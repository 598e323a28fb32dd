// ABOUTME: Lexical environment (Context) — name to Variable bindings plus an outer scope

use crate::error::EvalError;
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// The unit of lexical binding: a reference-counted mutable cell.
///
/// Closures capture `Variable`s, not `Value`s, so `set!` performed from
/// anywhere that holds the same `Variable` is visible everywhere else that
/// holds it too (spec.md §3, the "Lexical capture" invariant of §8).
pub type Variable = Rc<RefCell<Value>>;

/// A lexical scope: single-threaded by construction (`Rc`/`RefCell`, no
/// `Send`/`Sync`) per spec.md §5 — an `Environment` is never shareable
/// across threads, which this type enforces at compile time rather than by
/// convention.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Variable>>,
    parent: Option<Rc<Environment>>,
    /// `None` means "not a loop scope" — `is_running` defers to the parent
    /// chain in that case. `for`/`while` set this to `Some(true)` on entry;
    /// `break` walks outward and flips the nearest `Some(true)` it finds to
    /// `Some(false)`. Consulted by the loop builtins and by `begin` between
    /// expressions (spec.md §4.5, §5, §9).
    running: Cell<Option<bool>>,
}

impl Environment {
    /// The process-local root scope (spec.md §5: "lazily initialized exactly once").
    pub fn root() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
            running: Cell::new(None),
        })
    }

    /// A new child scope, as created on entry to a lambda call, `let`,
    /// `for`/`while`, or a clause body (spec.md §3 lifecycle).
    pub fn child(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
            running: Cell::new(None),
        })
    }

    /// Marks `self` as a loop scope with the given running state.
    pub fn set_running(&self, running: bool) {
        self.running.set(Some(running));
    }

    /// `true` unless `self` (or the nearest ancestor loop scope, if `self`
    /// isn't one) has been stopped by `break`. A scope with no enclosing
    /// loop at all is always considered running, so `begin` outside of any
    /// `for`/`while` never stops sequencing.
    pub fn is_running(&self) -> bool {
        match self.running.get() {
            Some(running) => running,
            None => match &self.parent {
                Some(parent) => parent.is_running(),
                None => true,
            },
        }
    }

    /// Walks outward from `self` and clears the nearest scope whose
    /// `running` flag is set to `true`. Returns `true` if a loop scope was
    /// found and stopped.
    pub fn break_loop(self: &Rc<Self>) -> bool {
        let mut scope = self.clone();
        loop {
            if scope.running.get() == Some(true) {
                scope.running.set(Some(false));
                return true;
            }
            match scope.parent.clone() {
                Some(p) => scope = p,
                None => return false,
            }
        }
    }

    /// Creates a new binding in THIS scope only. Fails with
    /// `symbol-already-exists` if `name` is already bound here — per
    /// spec.md's `def` semantics ("Fails if name is already bound in the
    /// current Environment"); the first binding is left untouched.
    pub fn define(&self, name: &str, value: Value) -> Result<Variable, EvalError> {
        let mut bindings = self.bindings.borrow_mut();
        if bindings.contains_key(name) {
            return Err(EvalError::SymbolAlreadyExists(name.to_string()));
        }
        let var = Rc::new(RefCell::new(value));
        bindings.insert(name.to_string(), Rc::clone(&var));
        Ok(var)
    }

    /// Like `define`, but overwrites an existing binding in this scope
    /// instead of failing. Used internally for `let`, lambda parameter
    /// binding, and root-environment bootstrap, where re-declaration in a
    /// fresh scope is never ambiguous with a prior user binding.
    pub fn bind(&self, name: &str, value: Value) -> Variable {
        let var = Rc::new(RefCell::new(value));
        self.bindings
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&var));
        var
    }

    /// Resolves `name` by walking this scope and its parents, innermost first.
    pub fn lookup(&self, name: &str) -> Option<Variable> {
        if let Some(var) = self.bindings.borrow().get(name) {
            return Some(Rc::clone(var));
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.lookup(name).map(|var| var.borrow().clone())
    }

    /// Mutates an existing binding found by walking the chain outward.
    /// Fails with `unknown-symbol` if no such binding exists anywhere.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        match self.lookup(name) {
            Some(var) => {
                *var.borrow_mut() = value;
                Ok(())
            }
            None => Err(EvalError::UnknownSymbol(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::root();
        env.define("x", Value::Int(42)).unwrap();
        assert_eq!(env.get("x"), Some(Value::Int(42)));
    }

    #[test]
    fn redefining_in_same_scope_is_an_error() {
        let env = Environment::root();
        env.define("x", Value::Int(1)).unwrap();
        let err = env.define("x", Value::Int(2)).unwrap_err();
        assert!(matches!(err, EvalError::SymbolAlreadyExists(_)));
        assert_eq!(env.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::root();
        parent.define("x", Value::Int(1)).unwrap();
        let child = Environment::child(&parent);
        assert_eq!(child.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::root();
        parent.define("x", Value::Int(1)).unwrap();
        let child = Environment::child(&parent);
        child.bind("x", Value::Int(2));
        assert_eq!(child.get("x"), Some(Value::Int(2)));
        assert_eq!(parent.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn set_mutates_through_shared_variable() {
        let parent = Environment::root();
        let var = parent.define("x", Value::Int(1)).unwrap();
        let child = Environment::child(&parent);
        child.set("x", Value::Int(99)).unwrap();
        assert_eq!(*var.borrow(), Value::Int(99));
        assert_eq!(parent.get("x"), Some(Value::Int(99)));
    }

    #[test]
    fn set_on_undefined_symbol_fails() {
        let env = Environment::root();
        assert!(matches!(
            env.set("missing", Value::Int(1)),
            Err(EvalError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn break_loop_finds_nearest_running_scope() {
        let root = Environment::root();
        let outer_loop = Environment::child(&root);
        outer_loop.set_running(true);
        let body = Environment::child(&outer_loop);
        assert!(body.break_loop());
        assert!(!outer_loop.is_running());
    }
}
