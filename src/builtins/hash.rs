// ABOUTME: hash, hash-get, hash-set!, hash-remove!, hash-size, hash-keys

use super::params::{parse_params, Param};
use super::util::eval_all;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{HashKey, Value};
use gel_macros::builtin;
use indexmap::IndexMap;
use std::rc::Rc;

/// `(hash k1 v1 k2 v2 …)` — flat alternating key/value pairs, all evaluated,
/// inserted in the order given (last write for a repeated key wins).
#[builtin(name = "hash", category = "hash")]
pub fn hash(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() % 2 != 0 {
        return Err(EvalError::wrong_arity("hash", "an even number of", args.len()));
    }
    let values = eval_all("hash", args, env)?;
    let mut entries = IndexMap::with_capacity(values.len() / 2);
    for pair in values.chunks(2) {
        entries.insert(HashKey(pair[0].clone()), pair[1].clone());
    }
    Ok(Value::hash(entries))
}

/// Missing keys yield `void` rather than an error, matching array
/// out-of-range reads being the only indexing operation that errors.
#[builtin(name = "hash-get", category = "hash")]
pub fn hash_get(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("hash-get", "HV", args, env)?;
    let (map, key) = match (&parsed[0], &parsed[1]) {
        (Param::Hash(h), Param::Value(v)) => (h, v.clone()),
        _ => unreachable!(),
    };
    let found = map.borrow().get(&HashKey(key)).cloned();
    Ok(found.unwrap_or(Value::Void))
}

#[builtin(name = "hash-set!", category = "hash")]
pub fn hash_set(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("hash-set!", "HVV", args, env)?;
    let (map, key, value) = match (&parsed[0], &parsed[1], &parsed[2]) {
        (Param::Hash(h), Param::Value(k), Param::Value(v)) => (h, k.clone(), v.clone()),
        _ => unreachable!(),
    };
    map.borrow_mut().insert(HashKey(key), value.clone());
    Ok(value)
}

#[builtin(name = "hash-remove!", category = "hash")]
pub fn hash_remove(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("hash-remove!", "HV", args, env)?;
    let (map, key) = match (&parsed[0], &parsed[1]) {
        (Param::Hash(h), Param::Value(v)) => (h, v.clone()),
        _ => unreachable!(),
    };
    let removed = map.borrow_mut().shift_remove(&HashKey(key));
    Ok(removed.unwrap_or(Value::Void))
}

#[builtin(name = "hash-size", category = "hash")]
pub fn hash_size(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("hash-size", "H", args, env)?;
    let map = match &parsed[0] {
        Param::Hash(h) => h,
        _ => unreachable!(),
    };
    Ok(Value::Int(map.borrow().len() as i64))
}

#[builtin(name = "hash-keys", category = "hash")]
pub fn hash_keys(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let parsed = parse_params("hash-keys", "H", args, env)?;
    let map = match &parsed[0] {
        Param::Hash(h) => h,
        _ => unreachable!(),
    };
    let keys = map.borrow().keys().map(|k| k.0.clone()).collect();
    Ok(Value::array(keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::util::quote_value;

    #[test]
    fn hash_builds_from_evaluated_pairs() {
        let env = Environment::root();
        let result = hash(&[Value::str("a"), Value::Int(1)], &env).unwrap();
        match result {
            Value::Hash(h) => assert_eq!(h.borrow().get(&HashKey(Value::str("a"))), Some(&Value::Int(1))),
            _ => panic!("expected hash"),
        }
    }

    #[test]
    fn hash_odd_argument_count_is_wrong_arity() {
        let env = Environment::root();
        let err = hash(&[Value::str("a")], &env).unwrap_err();
        assert!(matches!(err, EvalError::WrongArity { .. }));
    }

    #[test]
    fn hash_get_missing_key_is_void() {
        let env = Environment::root();
        crate::builtins::register_builtins(&env);
        let h = hash(&[Value::str("a"), Value::Int(1)], &env).unwrap();
        let result = hash_get(&[quote_value(h), Value::str("missing")], &env).unwrap();
        assert_eq!(result, Value::Void);
    }

    #[test]
    fn hash_set_overwrites_and_preserves_insertion_order() {
        let env = Environment::root();
        crate::builtins::register_builtins(&env);
        let h = hash(&[Value::str("a"), Value::Int(1)], &env).unwrap();
        hash_set(&[quote_value(h.clone()), Value::str("b"), Value::Int(2)], &env).unwrap();
        hash_set(&[quote_value(h.clone()), Value::str("a"), Value::Int(9)], &env).unwrap();
        let keys = hash_keys(&[quote_value(h)], &env).unwrap();
        assert_eq!(
            keys,
            Value::array(vec![Value::str("a"), Value::str("b")])
        );
    }
}
