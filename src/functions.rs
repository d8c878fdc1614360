//! Built-in host functions.
//!
//! These are ordinary [`HostFunction`]s a host can register by hand;
//! [`default_functions`] bundles the conventional trio used by rule
//! evaluation.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::EvalError;
use crate::universe::ops::partial_cmp_values;
use crate::universe::{FunctionMap, HostFunction};
use crate::values::Value;

pub fn abs(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Int(v)] => Ok(Value::Int(v.wrapping_abs())),
        [Value::Float(v)] => Ok(Value::Float(v.abs())),
        [other] => Err(EvalError::InvalidOperands {
            message: format!("abs() requires a number, not {}", other.type_name()),
        }),
        _ => Err(EvalError::InvalidOperands {
            message: format!("abs() takes exactly one argument ({} given)", args.len()),
        }),
    }
}

pub fn min(args: &[Value]) -> Result<Value, EvalError> {
    extreme("min", args, Ordering::Less)
}

pub fn max(args: &[Value]) -> Result<Value, EvalError> {
    extreme("max", args, Ordering::Greater)
}

fn extreme(name: &str, args: &[Value], keep: Ordering) -> Result<Value, EvalError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(EvalError::InvalidOperands {
            message: format!("{name}() expected at least one argument"),
        });
    };
    let mut best = first;
    for candidate in rest {
        let ordering = partial_cmp_values(candidate, best).ok_or_else(|| {
            EvalError::InvalidOperands {
                message: format!(
                    "{name}() arguments are not comparable: {} and {}",
                    candidate.type_name(),
                    best.type_name()
                ),
            }
        })?;
        if ordering == keep {
            best = candidate;
        }
    }
    Ok(best.clone())
}

/// `abs`, `min` and `max`, ready to hand to a universe.
pub fn default_functions() -> FunctionMap {
    FunctionMap::from([
        ("abs".to_string(), Arc::new(abs) as HostFunction),
        ("min".to_string(), Arc::new(min) as HostFunction),
        ("max".to_string(), Arc::new(max) as HostFunction),
    ])
}
