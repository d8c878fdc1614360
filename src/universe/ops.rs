//! Operator tables.
//!
//! An [`OpTable`] is an explicit, immutable map from operator kind to a pure
//! binary function. Universes own a table and consult nothing else, so there
//! is no process-wide mutable operator state. Two tables ship: the strict one
//! (arithmetic is numbers-only) and the weakly-typed one (failed operations
//! retry once after coercing both operands to float).

use std::cmp::Ordering;
use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::errors::EvalError;
use crate::parser::{BinaryOp, BoolOp};
use crate::universe::Thunks;
use crate::values::Value;

/// Internal operator failure, kept separate from the public taxonomy so the
/// weakly-typed table can tell retryable failures apart.
#[derive(Debug, Clone)]
pub(crate) enum OpError {
    /// Operand types don't fit the operator. The only class that triggers
    /// the weakly-typed coercion retry.
    TypeMismatch(String),
    /// Operand values are unacceptable (guards, division by zero). Never
    /// retried.
    Invalid(String),
}

impl From<OpError> for EvalError {
    fn from(err: OpError) -> Self {
        match err {
            OpError::TypeMismatch(message) | OpError::Invalid(message) => {
                EvalError::InvalidOperands { message }
            }
        }
    }
}

pub(crate) type BinFn = fn(&Value, &Value) -> Result<Value, OpError>;
type BinCheck = fn(&Value, &Value) -> Result<(), OpError>;

/// Immutable operator-kind → binary-function table.
#[derive(Clone)]
pub struct OpTable {
    ops: HashMap<BinaryOp, BinFn>,
}

impl OpTable {
    /// Arithmetic requires numeric operands; comparisons, membership and
    /// identity accept any value pair. `%` and `**` are absent.
    pub fn strict() -> OpTable {
        STRICT_OPS.clone()
    }

    /// Every operation is attempted natively first and retried once with
    /// both operands coerced to float on a type mismatch. Multiplication
    /// refuses string operands outright to keep repetition from blowing up
    /// memory.
    pub fn weakly_typed() -> OpTable {
        WEAKLY_TYPED_OPS.clone()
    }

    pub fn contains(&self, op: BinaryOp) -> bool {
        self.ops.contains_key(&op)
    }

    pub fn apply(&self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        let bin_op = self.ops.get(&op).ok_or_else(|| {
            EvalError::invalid_op(
                format!("binary operator {:?} is not allowed", op.symbol()),
                None,
            )
        })?;
        bin_op(left, right).map_err(EvalError::from)
    }
}

lazy_static! {
    static ref STRICT_OPS: OpTable = OpTable {
        ops: HashMap::from([
            (BinaryOp::Add, strict_add as BinFn),
            (BinaryOp::Sub, strict_sub),
            (BinaryOp::Mul, strict_mul),
            (BinaryOp::Div, strict_div),
            (BinaryOp::FloorDiv, strict_floordiv),
            (BinaryOp::Eq, native_eq),
            (BinaryOp::NotEq, native_ne),
            (BinaryOp::Lt, native_lt),
            (BinaryOp::LtE, native_le),
            (BinaryOp::Gt, native_gt),
            (BinaryOp::GtE, native_ge),
            (BinaryOp::In, native_in),
            (BinaryOp::NotIn, native_not_in),
            (BinaryOp::Is, native_is),
            (BinaryOp::IsNot, native_is_not),
        ]),
    };
    static ref WEAKLY_TYPED_OPS: OpTable = OpTable {
        ops: HashMap::from([
            (BinaryOp::Add, weak_add as BinFn),
            (BinaryOp::Sub, weak_sub),
            (BinaryOp::Mul, weak_mul),
            (BinaryOp::Div, weak_div),
            (BinaryOp::FloorDiv, weak_floordiv),
            (BinaryOp::Eq, weak_eq),
            (BinaryOp::NotEq, weak_ne),
            (BinaryOp::Lt, weak_lt),
            (BinaryOp::LtE, weak_le),
            (BinaryOp::Gt, weak_gt),
            (BinaryOp::GtE, weak_ge),
            (BinaryOp::In, native_in),
            (BinaryOp::NotIn, native_not_in),
            (BinaryOp::Is, native_is),
            (BinaryOp::IsNot, native_is_not),
        ]),
    };
}

/// Shared short-circuit convention for the shipped universes: `and` returns
/// the first falsy forced value or the last one, `or` the first truthy
/// forced value or the last one. Operands past the deciding one are never
/// evaluated.
pub fn evaluate_bool_op(
    op: BoolOp,
    mut operands: Thunks<'_, '_, '_>,
) -> Result<Value, EvalError> {
    let count = operands.len();
    let mut last = Value::Null;
    for index in 0..count {
        let value = operands.force(index)?;
        let decided = match op {
            BoolOp::And => !value.is_truthy(),
            BoolOp::Or => value.is_truthy(),
        };
        if decided {
            return Ok(value);
        }
        last = value;
    }
    Ok(last)
}

// ---------------------------------------------------------------------------
// Native operations
// ---------------------------------------------------------------------------

fn mismatch(op: &str, a: &Value, b: &Value) -> OpError {
    OpError::TypeMismatch(format!(
        "unsupported operand types for {op}: {} and {}",
        a.type_name(),
        b.type_name()
    ))
}

fn native_add(a: &Value, b: &Value) -> Result<Value, OpError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_add(*y))),
        (Value::Str(x), Value::Str(y)) => {
            let mut s = x.clone();
            s.push_str(y);
            Ok(Value::Str(s))
        }
        (Value::Tuple(x), Value::Tuple(y)) => {
            Ok(Value::Tuple(x.iter().chain(y).cloned().collect()))
        }
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => Ok(Value::Float(x + y)),
            _ => Err(mismatch("+", a, b)),
        },
    }
}

fn native_sub(a: &Value, b: &Value) -> Result<Value, OpError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_sub(*y))),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => Ok(Value::Float(x - y)),
            _ => Err(mismatch("-", a, b)),
        },
    }
}

fn native_mul(a: &Value, b: &Value) -> Result<Value, OpError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_mul(*y))),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => Ok(Value::Float(x * y)),
            _ => Err(mismatch("*", a, b)),
        },
    }
}

/// True division always yields a float.
fn native_div(a: &Value, b: &Value) -> Result<Value, OpError> {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => {
            if y == 0.0 {
                Err(OpError::Invalid("division by zero".into()))
            } else {
                Ok(Value::Float(x / y))
            }
        }
        _ => Err(mismatch("/", a, b)),
    }
}

fn native_floordiv(a: &Value, b: &Value) -> Result<Value, OpError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            if *y == 0 {
                return Err(OpError::Invalid("division by zero".into()));
            }
            // Floor semantics: round toward negative infinity. Wrapping
            // keeps i64::MIN / -1 from panicking.
            let quotient = x.wrapping_div(*y);
            let floored = if x.wrapping_rem(*y) != 0 && (*x < 0) != (*y < 0) {
                quotient - 1
            } else {
                quotient
            };
            Ok(Value::Int(floored))
        }
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => {
                if y == 0.0 {
                    Err(OpError::Invalid("division by zero".into()))
                } else {
                    Ok(Value::Float((x / y).floor()))
                }
            }
            _ => Err(mismatch("//", a, b)),
        },
    }
}

fn native_eq(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(a == b))
}

fn native_ne(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(a != b))
}

/// Native ordering over values: numeric pairs compare numerically, strings
/// and booleans by their natural order, tuples lexicographically. Anything
/// else is not comparable.
pub(crate) fn partial_cmp_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Tuple(x), Value::Tuple(y)) => {
            for (xi, yi) in x.iter().zip(y.iter()) {
                match partial_cmp_values(xi, yi)? {
                    Ordering::Equal => continue,
                    other => return Some(other),
                }
            }
            Some(x.len().cmp(&y.len()))
        }
        _ => {
            let x = a.as_number()?;
            let y = b.as_number()?;
            x.partial_cmp(&y)
        }
    }
}

fn ordering(op: &'static str, a: &Value, b: &Value) -> Result<Ordering, OpError> {
    partial_cmp_values(a, b).ok_or_else(|| {
        OpError::TypeMismatch(format!(
            "{} and {} are not orderable with {op}",
            a.type_name(),
            b.type_name()
        ))
    })
}

fn native_lt(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(ordering("<", a, b)? == Ordering::Less))
}

fn native_le(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(ordering("<=", a, b)? != Ordering::Greater))
}

fn native_gt(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(ordering(">", a, b)? == Ordering::Greater))
}

fn native_ge(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(ordering(">=", a, b)? != Ordering::Less))
}

fn contains(needle: &Value, haystack: &Value) -> Result<bool, OpError> {
    match haystack {
        Value::Tuple(items) | Value::Set(items) => Ok(items.contains(needle)),
        Value::Str(text) => match needle {
            Value::Str(part) => Ok(text.contains(part.as_str())),
            _ => Err(OpError::TypeMismatch(format!(
                "cannot search for {} in a string",
                needle.type_name()
            ))),
        },
        _ => Err(OpError::TypeMismatch(format!(
            "{} is not a container",
            haystack.type_name()
        ))),
    }
}

fn native_in(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(contains(a, b)?))
}

fn native_not_in(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(!contains(a, b)?))
}

fn native_is(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(a.is_same(b)))
}

fn native_is_not(a: &Value, b: &Value) -> Result<Value, OpError> {
    Ok(Value::Bool(!a.is_same(b)))
}

// ---------------------------------------------------------------------------
// Strict wrappers: arithmetic over numbers only
// ---------------------------------------------------------------------------

fn ensure_numbers(op: &str, a: &Value, b: &Value) -> Result<(), OpError> {
    if a.is_number() && b.is_number() {
        Ok(())
    } else {
        Err(OpError::TypeMismatch(format!(
            "operator {op:?} can only be used with numbers, not {} and {}",
            a.type_name(),
            b.type_name()
        )))
    }
}

fn strict_add(a: &Value, b: &Value) -> Result<Value, OpError> {
    ensure_numbers("add", a, b)?;
    native_add(a, b)
}

fn strict_sub(a: &Value, b: &Value) -> Result<Value, OpError> {
    ensure_numbers("sub", a, b)?;
    native_sub(a, b)
}

fn strict_mul(a: &Value, b: &Value) -> Result<Value, OpError> {
    ensure_numbers("mul", a, b)?;
    native_mul(a, b)
}

fn strict_div(a: &Value, b: &Value) -> Result<Value, OpError> {
    ensure_numbers("div", a, b)?;
    native_div(a, b)
}

fn strict_floordiv(a: &Value, b: &Value) -> Result<Value, OpError> {
    ensure_numbers("fdiv", a, b)?;
    native_floordiv(a, b)
}

// ---------------------------------------------------------------------------
// Weakly-typed wrappers: retry once with float-coerced operands
// ---------------------------------------------------------------------------

/// Numeric coercion used by the retry: numbers pass through, booleans count
/// as 1/0, strings are parsed. Everything else refuses to coerce.
fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(*v),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Attempt `op` natively; on a type mismatch, retry once with both operands
/// coerced to float. If the retry cannot run or fails, the original error
/// propagates. The optional check runs before every attempt, coerced or not.
fn weakly(
    op: BinFn,
    check: Option<BinCheck>,
    a: &Value,
    b: &Value,
) -> Result<Value, OpError> {
    let attempt = |x: &Value, y: &Value| -> Result<Value, OpError> {
        if let Some(check) = check {
            check(x, y)?;
        }
        op(x, y)
    };
    match attempt(a, b) {
        Err(original @ OpError::TypeMismatch(_)) => {
            if let (Some(x), Some(y)) = (coerce_float(a), coerce_float(b)) {
                if let Ok(value) = attempt(&Value::Float(x), &Value::Float(y)) {
                    return Ok(value);
                }
            }
            Err(original)
        }
        result => result,
    }
}

fn no_string_mul(a: &Value, b: &Value) -> Result<(), OpError> {
    if matches!(a, Value::Str(_)) || matches!(b, Value::Str(_)) {
        Err(OpError::Invalid("strings cannot be multiplied".into()))
    } else {
        Ok(())
    }
}

fn weak_add(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_add, None, a, b)
}

fn weak_sub(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_sub, None, a, b)
}

fn weak_mul(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_mul, Some(no_string_mul), a, b)
}

fn weak_div(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_div, None, a, b)
}

fn weak_floordiv(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_floordiv, None, a, b)
}

fn weak_eq(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_eq, None, a, b)
}

fn weak_ne(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_ne, None, a, b)
}

fn weak_lt(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_lt, None, a, b)
}

fn weak_le(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_le, None, a, b)
}

fn weak_gt(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_gt, None, a, b)
}

fn weak_ge(a: &Value, b: &Value) -> Result<Value, OpError> {
    weakly(native_ge, None, a, b)
}
