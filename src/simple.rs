//! One-call convenience entry points.

use crate::errors::EvalError;
use crate::evaluator::{Evaluator, EvaluatorOptions};
use crate::universe::{FunctionMap, SimpleUniverse, ValueMap, VerifierUniverse};
use crate::values::Value;

/// Safely evaluate a simple expression against the given name and function
/// mappings, with default options.
///
/// ```
/// use warden::simple::simple_eval;
/// use warden::values::Value;
///
/// let values = [("foo".into(), Value::Int(7))].into_iter().collect();
/// let result = simple_eval("foo + 10 > 5", values, Default::default()).unwrap();
/// assert_eq!(result, Value::Bool(true));
/// ```
pub fn simple_eval(
    expression: &str,
    values: ValueMap,
    functions: FunctionMap,
) -> Result<Value, EvalError> {
    simple_eval_with_options(expression, values, functions, EvaluatorOptions::default())
}

/// [`simple_eval`] with explicit evaluator options.
pub fn simple_eval_with_options(
    expression: &str,
    values: ValueMap,
    functions: FunctionMap,
    options: EvaluatorOptions,
) -> Result<Value, EvalError> {
    let universe = SimpleUniverse::new(values, functions);
    Evaluator::with_options(universe, options).evaluate_expression(expression)
}

/// Check that an expression is structurally legal — parses, stays on the
/// allow-list and within complexity limits — without computing real values.
///
/// Value-dependent failures (unknown names, unknown functions, operand type
/// errors) cannot surface here, since the verifying universe never produces
/// real values.
pub fn verify_expression(expression: &str, options: EvaluatorOptions) -> Result<(), EvalError> {
    Evaluator::with_options(VerifierUniverse::new(), options)
        .evaluate_expression(expression)
        .map(|_| ())
}
