// ABOUTME: require, ., object-new, object-get, object-set, object-connect —
// opaque stubs for the host-introspection surface this interpreter does not implement.
//
// These names are registered so a script referencing them gets a typed
// `not-instantiatable` evaluation error instead of `unknown-symbol`, per the
// distinction the host type system draws between "doesn't exist" and
// "exists, but this embedding has no host object model".

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use gel_macros::builtin;
use std::rc::Rc;

fn not_instantiatable(name: &str) -> Result<Value, EvalError> {
    Err(EvalError::NotInstantiatable {
        type_name: name.to_string(),
    })
}

#[builtin(name = "require", category = "introspection")]
pub fn require(_args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    not_instantiatable("module")
}

#[builtin(name = ".", category = "introspection")]
pub fn dot(_args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    not_instantiatable("object")
}

#[builtin(name = "object-new", category = "introspection")]
pub fn object_new(_args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    not_instantiatable("object")
}

#[builtin(name = "object-get", category = "introspection")]
pub fn object_get(_args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    not_instantiatable("object")
}

#[builtin(name = "object-set", category = "introspection")]
pub fn object_set(_args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    not_instantiatable("object")
}

#[builtin(name = "object-connect", category = "introspection")]
pub fn object_connect(_args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    not_instantiatable("object")
}
