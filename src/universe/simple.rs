use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::EvalError;
use crate::parser::{BinaryOp, BoolOp};
use crate::universe::{OpTable, Thunks, Universe, ops};
use crate::values::{QualifiedName, Value};

/// A host-provided function: takes already-forced argument values.
pub type HostFunction = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// Mapping of (possibly dotted) names to values.
pub type ValueMap = HashMap<QualifiedName, Value>;

/// Mapping of function names to host functions.
pub type FunctionMap = HashMap<String, HostFunction>;

/// A universe backed by two immutable maps and an operator table, all fixed
/// at construction.
///
/// The composition is explicit: resolution comes from the maps, operator
/// semantics from the table, so "weakly-typed and simple-backed" is just the
/// same maps over a different table.
pub struct SimpleUniverse {
    values: ValueMap,
    functions: FunctionMap,
    ops: OpTable,
}

impl SimpleUniverse {
    /// Strict operator semantics: arithmetic wants numbers.
    pub fn new(values: ValueMap, functions: FunctionMap) -> Self {
        Self::with_ops(values, functions, OpTable::strict())
    }

    /// Coercing operator semantics; see [`OpTable::weakly_typed`].
    pub fn weakly_typed(values: ValueMap, functions: FunctionMap) -> Self {
        Self::with_ops(values, functions, OpTable::weakly_typed())
    }

    pub fn with_ops(values: ValueMap, functions: FunctionMap, ops: OpTable) -> Self {
        Self {
            values,
            functions,
            ops,
        }
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Apply a registered function to already-forced arguments.
    ///
    /// Exposed so wrapper universes can interpose their own argument
    /// policies without re-implementing the lookup.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| EvalError::NoSuchFunction { name: name.into() })?;
        function(args)
    }
}

impl Universe for SimpleUniverse {
    fn get_value(&self, name: &QualifiedName) -> Result<Value, EvalError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::NoSuchValue { name: name.clone() })
    }

    fn evaluate_function(
        &self,
        name: &str,
        mut args: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        if !self.functions.contains_key(name) {
            return Err(EvalError::NoSuchFunction { name: name.into() });
        }
        let args = args.force_all()?;
        self.call(name, &args)
    }

    fn evaluate_binary_op(
        &self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, EvalError> {
        self.ops.apply(op, left, right)
    }

    fn evaluate_bool_op(
        &self,
        op: BoolOp,
        operands: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        ops::evaluate_bool_op(op, operands)
    }
}
