//! Unit tests for the operator tables.

use std::cmp::Ordering;

use pretty_assertions::assert_eq;

use crate::errors::EvalError;
use crate::parser::BinaryOp;
use crate::universe::OpTable;
use crate::universe::ops::partial_cmp_values;
use crate::values::Value;

fn strict(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    OpTable::strict().apply(op, &left, &right)
}

fn weak(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    OpTable::weakly_typed().apply(op, &left, &right)
}

// ============================================================================
// Strict arithmetic
// ============================================================================

#[test]
fn test_strict_int_arithmetic() {
    assert_eq!(
        strict(BinaryOp::Add, Value::Int(2), Value::Int(3)).unwrap(),
        Value::Int(5)
    );
    assert_eq!(
        strict(BinaryOp::Sub, Value::Int(10), Value::Int(4)).unwrap(),
        Value::Int(6)
    );
    assert_eq!(
        strict(BinaryOp::Mul, Value::Int(3), Value::Int(4)).unwrap(),
        Value::Int(12)
    );
}

#[test]
fn test_strict_mixed_arithmetic_promotes_to_float() {
    assert_eq!(
        strict(BinaryOp::Add, Value::Int(2), Value::Float(0.5)).unwrap(),
        Value::Float(2.5)
    );
}

#[test]
fn test_strict_true_division_is_float() {
    assert_eq!(
        strict(BinaryOp::Div, Value::Int(10), Value::Int(4)).unwrap(),
        Value::Float(2.5)
    );
}

#[test]
fn test_strict_floor_division_floors_toward_negative_infinity() {
    assert_eq!(
        strict(BinaryOp::FloorDiv, Value::Int(7), Value::Int(2)).unwrap(),
        Value::Int(3)
    );
    assert_eq!(
        strict(BinaryOp::FloorDiv, Value::Int(-7), Value::Int(2)).unwrap(),
        Value::Int(-4)
    );
    assert_eq!(
        strict(BinaryOp::FloorDiv, Value::Int(7), Value::Int(-2)).unwrap(),
        Value::Int(-4)
    );
}

#[test]
fn test_strict_int_arithmetic_wraps() {
    assert_eq!(
        strict(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1)).unwrap(),
        Value::Int(i64::MIN)
    );
}

#[test]
fn test_strict_division_by_zero() {
    assert!(matches!(
        strict(BinaryOp::Div, Value::Int(1), Value::Int(0)),
        Err(EvalError::InvalidOperands { .. })
    ));
    assert!(matches!(
        strict(BinaryOp::FloorDiv, Value::Int(1), Value::Int(0)),
        Err(EvalError::InvalidOperands { .. })
    ));
}

#[test]
fn test_strict_arithmetic_rejects_non_numbers() {
    assert!(matches!(
        strict(BinaryOp::Add, Value::str("a"), Value::str("b")),
        Err(EvalError::InvalidOperands { .. })
    ));
    assert!(matches!(
        strict(BinaryOp::Mul, Value::str("stack"), Value::Int(10000)),
        Err(EvalError::InvalidOperands { .. })
    ));
}

#[test]
fn test_unknown_operator_kind_is_invalid_operation() {
    assert!(matches!(
        strict(BinaryOp::Mod, Value::Int(7), Value::Int(3)),
        Err(EvalError::InvalidOperation { .. })
    ));
    assert!(matches!(
        strict(BinaryOp::Pow, Value::Int(2), Value::Int(3)),
        Err(EvalError::InvalidOperation { .. })
    ));
}

// ============================================================================
// Comparisons, membership, identity
// ============================================================================

#[test]
fn test_comparisons_accept_any_comparable_pair() {
    assert_eq!(
        strict(BinaryOp::Lt, Value::Int(2), Value::Float(2.5)).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        strict(BinaryOp::Gt, Value::str("b"), Value::str("a")).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_tuple_comparison_is_lexicographic() {
    let a = Value::Tuple(vec![Value::Int(8), Value::Int(3)]);
    let b = Value::Tuple(vec![Value::Int(9), Value::Int(2)]);
    assert_eq!(strict(BinaryOp::GtE, a, b).unwrap(), Value::Bool(false));
}

#[test]
fn test_unorderable_pair_is_invalid_operands() {
    assert!(matches!(
        strict(BinaryOp::Lt, Value::str("a"), Value::Int(1)),
        Err(EvalError::InvalidOperands { .. })
    ));
}

#[test]
fn test_membership() {
    let haystack = Value::Tuple(vec![Value::Int(7), Value::Int(6), Value::Int(2)]);
    assert_eq!(
        strict(BinaryOp::In, Value::Int(6), haystack.clone()).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        strict(BinaryOp::NotIn, Value::Int(8), haystack).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        strict(BinaryOp::In, Value::str("ud"), Value::str("muda")).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_membership_in_non_container() {
    assert!(matches!(
        strict(BinaryOp::In, Value::Int(1), Value::Int(2)),
        Err(EvalError::InvalidOperands { .. })
    ));
}

#[test]
fn test_identity() {
    assert_eq!(
        strict(BinaryOp::Is, Value::Null, Value::Null).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        strict(BinaryOp::Is, Value::Int(8), Value::Float(8.0)).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        strict(BinaryOp::IsNot, Value::Null, Value::Int(1)).unwrap(),
        Value::Bool(true)
    );
}

// ============================================================================
// Weak typing
// ============================================================================

#[test]
fn test_weak_string_concatenation() {
    assert_eq!(
        weak(BinaryOp::Add, Value::str("8"), Value::str("8")).unwrap(),
        Value::str("88")
    );
}

#[test]
fn test_weak_coercion_on_mixed_types() {
    assert_eq!(
        weak(BinaryOp::Add, Value::str("8"), Value::Int(8)).unwrap(),
        Value::Float(16.0)
    );
    assert_eq!(
        weak(BinaryOp::Sub, Value::str(" 10 "), Value::str("4")).unwrap(),
        Value::Float(6.0)
    );
}

#[test]
fn test_weak_coercion_of_booleans() {
    assert_eq!(
        weak(BinaryOp::Add, Value::Bool(true), Value::Int(1)).unwrap(),
        Value::Float(2.0)
    );
}

#[test]
fn test_weak_coercion_failure_keeps_original_error() {
    let err = weak(BinaryOp::Add, Value::str("x"), Value::Int(1)).expect_err("must fail");
    let EvalError::InvalidOperands { message } = err else {
        panic!("unexpected error");
    };
    // The propagated error is the native type mismatch, not a parse error.
    assert!(message.contains("str"), "message was {message:?}");
}

#[test]
fn test_weak_string_multiplication_guard_fires_before_coercion() {
    assert!(matches!(
        weak(BinaryOp::Mul, Value::str("8"), Value::Int(2)),
        Err(EvalError::InvalidOperands { .. })
    ));
    assert!(matches!(
        weak(BinaryOp::Mul, Value::Int(2), Value::str("8")),
        Err(EvalError::InvalidOperands { .. })
    ));
}

#[test]
fn test_weak_division_by_zero_is_not_retried() {
    assert!(matches!(
        weak(BinaryOp::Div, Value::Int(1), Value::Int(0)),
        Err(EvalError::InvalidOperands { .. })
    ));
}

#[test]
fn test_weak_identity_present() {
    assert_eq!(
        weak(BinaryOp::Is, Value::Null, Value::Null).unwrap(),
        Value::Bool(true)
    );
}

// ============================================================================
// Native ordering helper
// ============================================================================

#[test]
fn test_partial_cmp_values() {
    assert_eq!(
        partial_cmp_values(&Value::Int(1), &Value::Float(2.0)),
        Some(Ordering::Less)
    );
    assert_eq!(
        partial_cmp_values(&Value::str("a"), &Value::str("a")),
        Some(Ordering::Equal)
    );
    assert_eq!(partial_cmp_values(&Value::str("a"), &Value::Int(1)), None);
    let short = Value::Tuple(vec![Value::Int(1)]);
    let long = Value::Tuple(vec![Value::Int(1), Value::Int(0)]);
    assert_eq!(partial_cmp_values(&short, &long), Some(Ordering::Less));
}
