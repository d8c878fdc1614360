//! The evaluation error taxonomy.
//!
//! Every failure aborts the whole `evaluate_expression` call; there is no
//! partial result and no retry anywhere in the core. The single designed
//! recovery is the loose-identity accommodation in the evaluator, which maps
//! a `NoSuchValue` operand of `is`/`is not` to null before the comparison
//! runs.
//!
//! Variants carry the source span of the offending node where one exists, so
//! hosts can point at the failing fragment when rendering their own
//! user-facing message.

use std::time::Duration;

use thiserror::Error;

use crate::parser::Span;
use crate::values::QualifiedName;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The text failed to parse (including pre-parse rewriting that could
    /// not produce parseable output).
    #[error("syntax error: {message}")]
    Syntax { message: String },

    /// The node kind is not on the evaluator's allow-list.
    #[error("operation {kind} is not allowed")]
    InvalidNode { kind: &'static str, span: Span },

    /// A lexically valid construct the sandbox rejects: chained comparisons,
    /// keyword arguments, calling a non-name, indexing, a disallowed
    /// container kind, an unsupported operator.
    #[error("{message}")]
    InvalidOperation { message: String, span: Option<Span> },

    /// A literal whose type is outside the configured constant policy.
    #[error("constant of type {kind} is not allowed")]
    InvalidConstant { kind: &'static str, span: Span },

    /// An attribute chain not rooted in a bare name (e.g. rooted in a
    /// literal), which would require introspecting a live value.
    #[error("attribute access must be rooted in a plain name")]
    InvalidAttribute { span: Span },

    /// Operator received operand values it does not accept.
    #[error("{message}")]
    InvalidOperands { message: String },

    /// Name resolution failed.
    #[error("no value named {name}")]
    NoSuchValue { name: QualifiedName },

    /// Function-name resolution failed.
    #[error("no function named {name}")]
    NoSuchFunction { name: String },

    /// The recursion depth budget was exhausted.
    #[error("expression is too complex (depth limit {max_depth})")]
    TooComplex { max_depth: usize },

    /// The wall-clock budget was exhausted.
    #[error("evaluation exceeded the time budget of {limit:?}")]
    Timeout { limit: Duration },
}

impl EvalError {
    /// Shorthand for the common invalid-operation case.
    pub(crate) fn invalid_op(message: impl Into<String>, span: Option<Span>) -> Self {
        EvalError::InvalidOperation {
            message: message.into(),
            span,
        }
    }
}
