//! Warden — a sandboxed evaluator for user-supplied expressions.
//!
//! # Overview
//!
//! Warden evaluates small boolean/arithmetic expressions — alerting rules,
//! feature-flag conditions, pipeline gates — without ever executing
//! arbitrary code. Expressions are parsed into a tree whose node kinds form
//! a closed allow-list; the tree walk runs under depth and wall-clock
//! budgets; and everything a node *means* (name lookup, function calls,
//! operator semantics) is delegated to a pluggable [`Universe`] the host
//! controls.
//!
//! # Quick start
//!
//! ```
//! use warden::simple::simple_eval;
//! use warden::values::Value;
//! use warden::universe::HostFunction;
//! use std::sync::Arc;
//!
//! let values = [("foo".into(), Value::Int(7))].into_iter().collect();
//! let functions = [(
//!     "abs".to_string(),
//!     Arc::new(warden::functions::abs) as HostFunction,
//! )]
//! .into_iter()
//! .collect();
//!
//! let result = simple_eval("abs(foo + 10) > 5", values, functions).unwrap();
//! assert_eq!(result, Value::Bool(true));
//! ```
//!
//! # What is never allowed
//!
//! Statements, assignment, control flow, indexing and slicing, list/dict
//! construction, comprehensions, f-strings, lambdas, chained comparisons,
//! keyword arguments, calling anything but a bare name — and, crucially,
//! attribute traversal on live values: `a.b.c` is resolved by asking the
//! universe for the *compound* name `("a", "b", "c")`, never by looking up
//! `.c` on whatever `a.b` might be.
//!
//! # Custom universes
//!
//! Implement [`Universe`] to control name resolution, function dispatch and
//! operator semantics. The shipped [`SimpleUniverse`] covers the common
//! case of immutable value/function maps; [`VerifierUniverse`] validates
//! stored expressions without computing anything.

pub mod errors;
pub mod evaluator;
pub mod extras;
pub mod functions;
pub mod parser;
pub mod rewriter;
pub mod simple;
pub mod universe;
pub mod values;

pub use errors::EvalError;
pub use evaluator::{ConstantPolicy, ContainerPolicy, Evaluator, EvaluatorOptions};
pub use simple::{simple_eval, simple_eval_with_options, verify_expression};
pub use universe::{
    FunctionMap, HostFunction, OpTable, SimpleUniverse, Thunks, Universe, ValueMap,
    VerifierUniverse,
};
pub use values::{OpaqueValue, QualifiedName, Value};
