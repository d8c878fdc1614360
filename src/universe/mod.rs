//! Pluggable evaluation semantics.
//!
//! A [`Universe`] supplies all "what does this mean" decisions — name
//! resolution, function dispatch, operator semantics — while the evaluator
//! decides only "is this allowed, and in what order". The shipped variants:
//!
//! - [`SimpleUniverse`]: immutable name→value and name→function maps over a
//!   strict (numbers-only arithmetic) operator table.
//! - `SimpleUniverse::weakly_typed`: the same maps over a coercing operator
//!   table that retries failed operations after float coercion.
//! - [`VerifierUniverse`]: walks as much of the tree as possible without
//!   computing anything, for validating stored expressions up front.

pub mod ops;
mod simple;
mod verifier;

pub use ops::OpTable;
pub use simple::{FunctionMap, HostFunction, SimpleUniverse, ValueMap};
pub use verifier::VerifierUniverse;

use crate::errors::EvalError;
use crate::evaluator::eval::Walker;
use crate::parser::{BinaryOp, BoolOp, Node};
use crate::values::{QualifiedName, Value};

#[cfg(test)]
mod ops_test;

/// The capability set a host implements to give expressions meaning.
///
/// Default method bodies refuse everything, so a universe only opts into the
/// capabilities it actually wants to expose.
pub trait Universe {
    /// Resolve a (possibly dotted) name to a value.
    fn get_value(&self, name: &QualifiedName) -> Result<Value, EvalError> {
        Err(EvalError::NoSuchValue { name: name.clone() })
    }

    /// Apply the named function to the given lazily-evaluated arguments.
    ///
    /// The universe decides which thunks to force, and in what order;
    /// forcing re-enters the walker, so depth and time budgets still apply.
    fn evaluate_function(
        &self,
        name: &str,
        args: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        let _ = args;
        Err(EvalError::NoSuchFunction { name: name.into() })
    }

    /// Apply a binary operator to two already-evaluated operands.
    fn evaluate_binary_op(
        &self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, EvalError> {
        let _ = (left, right);
        Err(EvalError::invalid_op(
            format!("binary operator {:?} is not allowed", op.symbol()),
            None,
        ))
    }

    /// Apply a boolean operator to lazily-evaluated operands, controlling
    /// short-circuit order.
    fn evaluate_bool_op(
        &self,
        op: BoolOp,
        operands: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        let _ = operands;
        Err(EvalError::invalid_op(
            format!("boolean operator {:?} is not allowed", op.symbol()),
            None,
        ))
    }
}

/// A sequence of deferred sub-evaluations, handed to a universe for calls
/// and boolean operators.
///
/// Each `force` re-visits the corresponding operand subtree with full budget
/// bookkeeping; results are not cached, so forcing the same index twice
/// re-evaluates.
pub struct Thunks<'w, 'a, 'n> {
    walker: &'w mut Walker<'a>,
    nodes: &'n [Node],
}

impl<'w, 'a, 'n> Thunks<'w, 'a, 'n> {
    pub(crate) fn new(walker: &'w mut Walker<'a>, nodes: &'n [Node]) -> Self {
        Self { walker, nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Evaluate the operand at `index`.
    pub fn force(&mut self, index: usize) -> Result<Value, EvalError> {
        let nodes = self.nodes;
        let node = nodes.get(index).ok_or_else(|| {
            EvalError::invalid_op(format!("no operand at index {index}"), None)
        })?;
        self.walker.visit(node)
    }

    /// Evaluate every operand, left to right.
    pub fn force_all(&mut self) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::with_capacity(self.nodes.len());
        for index in 0..self.nodes.len() {
            values.push(self.force(index)?);
        }
        Ok(values)
    }
}
