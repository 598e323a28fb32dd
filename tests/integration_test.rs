// ABOUTME: End-to-end scenarios exercising the parser and evaluator together

use gel::{root_environment, EvalError, ParseError, RunError, Value};
use std::rc::Rc;

fn setup() -> Rc<gel::Environment> {
    root_environment()
}

fn eval_expr(code: &str, env: &Rc<gel::Environment>) -> Result<Value, RunError> {
    gel::run(code, env)
}

#[test]
fn arithmetic_promotes_to_double_only_when_needed() {
    let env = setup();
    assert_eq!(eval_expr("(+ 1 2 3)", &env).unwrap(), Value::Int(6));
    assert_eq!(eval_expr("(+ 1.0 2 3)", &env).unwrap(), Value::Double(6.0));
}

#[test]
fn recursive_factorial_via_def() {
    let env = setup();
    let program = "(def (fact n) (if (<= n 1) 1 (* n (fact (- n 1))))) (fact 6)";
    assert_eq!(eval_expr(program, &env).unwrap(), Value::Int(720));
}

#[test]
fn closure_over_let_binding_mutates_across_calls() {
    let env = setup();
    let program = "
        (def c (let ((x 0)) (closure () (set! x (+ x 1)) x)))
        (c) (c) (c)
    ";
    assert_eq!(eval_expr(program, &env).unwrap(), Value::Int(3));
}

#[test]
fn array_append_and_negative_index_get() {
    let env = setup();
    let program = "
        (def a [1 2 3])
        (array-append! a 4)
        (array-size a)
    ";
    assert_eq!(eval_expr(program, &env).unwrap(), Value::Int(4));
    assert_eq!(
        eval_expr("(array-get a -1)", &env).unwrap(),
        Value::Int(4)
    );
}

#[test]
fn hash_set_and_get_round_trip_with_merge() {
    let env = setup();
    let program = r#"
        (def h {"a" 1 "b" 2})
        (hash-set! h "a" 10)
        (+ (hash-get h "a") (hash-get h "b"))
    "#;
    assert_eq!(eval_expr(program, &env).unwrap(), Value::Int(12));
}

#[test]
fn map_over_range_squares_each_element() {
    let env = setup();
    let program = "(map (closure (x) (* x x)) (range 1 4))";
    let result = eval_expr(program, &env).unwrap();
    assert_eq!(
        result,
        Value::array(vec![
            Value::Int(1),
            Value::Int(4),
            Value::Int(9),
            Value::Int(16)
        ])
    );
}

#[test]
fn unclosed_array_reports_the_opening_parens_column() {
    let env = setup();
    let err = eval_expr("(+ 1 2", &env).unwrap_err();
    match err {
        RunError::Parse(ParseError::UnexpectedEofInArray { opened_at, .. }) => {
            assert_eq!(opened_at.column, 1);
        }
        other => panic!("expected UnexpectedEofInArray, got {other:?}"),
    }
}

#[test]
fn redefining_a_name_is_an_error_and_leaves_the_first_binding() {
    let env = setup();
    eval_expr("(def x 1)", &env).unwrap();
    let err = eval_expr("(def x 2)", &env).unwrap_err();
    assert!(matches!(err, RunError::Eval(EvalError::SymbolAlreadyExists(_))));
    assert_eq!(eval_expr("x", &env).unwrap(), Value::Int(1));
}

#[test]
fn wrong_arity_call_does_not_mutate_the_environment() {
    let env = setup();
    eval_expr("(def (add-two a b) (+ a b))", &env).unwrap();
    let err = eval_expr("(add-two 1)", &env).unwrap_err();
    assert!(matches!(err, RunError::Eval(EvalError::WrongArity { .. })));
    // The closure itself is unaffected and still callable correctly.
    assert_eq!(eval_expr("(add-two 1 2)", &env).unwrap(), Value::Int(3));
}

#[test]
fn break_leaves_the_loops_last_value_and_outer_scope_running() {
    let env = setup();
    let program = "
        (def result
          (let ((i 0) (last 0))
            (while (< i 10)
              (set! last i)
              (set! i (+ i 1))
              (if (= i 3) (break)))
            last))
        result
    ";
    assert_eq!(eval_expr(program, &env).unwrap(), Value::Int(2));
    // The outer let-scope is not a loop; it never had `running` set, and
    // further evaluation in the same environment still works normally.
    assert_eq!(eval_expr("(+ result 1)", &env).unwrap(), Value::Int(3));
}

#[test]
fn mutating_a_captured_array_is_visible_through_every_handle() {
    let env = setup();
    let program = "
        (def original [1 2 3])
        (def container (array original))
        (array-set! (array-get container 0) 0 99)
        (array-get original 0)
    ";
    assert_eq!(eval_expr(program, &env).unwrap(), Value::Int(99));
}
