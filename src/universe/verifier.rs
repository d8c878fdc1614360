use crate::errors::EvalError;
use crate::parser::{BinaryOp, BoolOp};
use crate::universe::{OpTable, Thunks, Universe};
use crate::values::{QualifiedName, Value};

/// A universe that has the evaluator walk as much of the tree as possible
/// without computing anything.
///
/// Every name resolves to a fixed truthy placeholder, every function forces
/// all of its arguments (so sandbox violations anywhere in the tree still
/// surface) and returns the placeholder, and operators are checked only for
/// being known kinds. Useful for validating a stored expression before it is
/// ever run against real values.
pub struct VerifierUniverse {
    ops: OpTable,
}

impl VerifierUniverse {
    pub fn new() -> Self {
        Self {
            ops: OpTable::strict(),
        }
    }
}

impl Default for VerifierUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe for VerifierUniverse {
    fn get_value(&self, _name: &QualifiedName) -> Result<Value, EvalError> {
        Ok(Value::Bool(true))
    }

    fn evaluate_function(
        &self,
        _name: &str,
        mut args: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        args.force_all()?;
        Ok(Value::Bool(true))
    }

    fn evaluate_binary_op(
        &self,
        op: BinaryOp,
        _left: &Value,
        _right: &Value,
    ) -> Result<Value, EvalError> {
        if !self.ops.contains(op) {
            return Err(EvalError::invalid_op(
                format!("binary operator {:?} is not allowed", op.symbol()),
                None,
            ));
        }
        Ok(Value::Bool(true))
    }

    fn evaluate_bool_op(
        &self,
        _op: BoolOp,
        mut operands: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        operands.force_all()?;
        Ok(Value::Bool(true))
    }
}
