use std::time::Duration;

use crate::errors::EvalError;
use crate::evaluator::{Evaluator, EvaluatorOptions};
use crate::functions::default_functions;
use crate::parser::{BinaryOp, BoolOp};
use crate::rewriter::{RewriteRules, is_reserved};
use crate::universe::{FunctionMap, SimpleUniverse, Thunks, Universe, ValueMap, VerifierUniverse};
use crate::values::{QualifiedName, Value};

/// Prefix applied to reserved keywords so they survive as identifiers. The
/// undertie (U+203F) is a valid identifier character that realistic rule
/// sources never contain, so prepared names cannot collide with user input.
pub const KEYWORD_PREFIX: &str = "K\u{203f}";

/// Separator joining the parts of a dashed name (`foo-bar` → `foo‿‿bar`).
pub const DASH_SEPARATOR: &str = "\u{203f}\u{203f}";

/// Rewrite strategy used by [`RuleEvaluator`]: keyword-prefix substitution
/// plus dashed-identifier gluing.
pub struct KeywordPrefixRules;

impl RewriteRules for KeywordPrefixRules {
    fn rewrite_keyword(&self, keyword: &str) -> Result<String, EvalError> {
        Ok(format!("{KEYWORD_PREFIX}{keyword}"))
    }

    fn dash_separator(&self) -> Option<&str> {
        Some(DASH_SEPARATOR)
    }
}

/// Rewrite one dash-separated name segment the way expression rewriting
/// would, so value-map keys land on the same internal names.
pub fn prepare_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            if is_reserved(part) {
                format!("{KEYWORD_PREFIX}{part}")
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(DASH_SEPARATOR)
}

/// Prepare a values mapping by rewriting every key segment.
pub fn prepare_values(values: &ValueMap) -> ValueMap {
    values
        .iter()
        .map(|(key, value)| {
            let segments = key.segments().iter().map(|segment| prepare_name(segment));
            (QualifiedName::from_segments(segments), value.clone())
        })
        .collect()
}

/// The weakly-typed simple universe with a scalar-arguments policy layered
/// on top: host functions only ever see ints, floats, strings and booleans.
struct ScalarArgsUniverse {
    inner: SimpleUniverse,
}

impl Universe for ScalarArgsUniverse {
    fn get_value(&self, name: &QualifiedName) -> Result<Value, EvalError> {
        self.inner.get_value(name)
    }

    fn evaluate_function(
        &self,
        name: &str,
        mut args: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        if !self.inner.has_function(name) {
            return Err(EvalError::NoSuchFunction { name: name.into() });
        }
        let args = args.force_all()?;
        for arg in &args {
            match arg {
                Value::Int(_) | Value::Float(_) | Value::Str(_) | Value::Bool(_) => {}
                other => {
                    return Err(EvalError::InvalidOperands {
                        message: format!(
                            "invalid argument for {name}: {}",
                            other.type_name()
                        ),
                    });
                }
            }
        }
        self.inner.call(name, &args)
    }

    fn evaluate_binary_op(
        &self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, EvalError> {
        self.inner.evaluate_binary_op(op, left, right)
    }

    fn evaluate_bool_op(
        &self,
        op: BoolOp,
        operands: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        self.inner.evaluate_bool_op(op, operands)
    }
}

/// A ready-made evaluator for stored boolean rules: weak typing, keyword and
/// dashed-name rewriting, tight complexity and time budgets, and a small
/// default function set (`abs`, `min`, `max`).
pub struct RuleEvaluator {
    pub functions: FunctionMap,
    pub max_depth: usize,
    pub max_time: Duration,
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self {
            functions: default_functions(),
            max_depth: 8,
            max_time: Duration::from_millis(200),
        }
    }
}

impl RuleEvaluator {
    /// Evaluate a rule against the given values, as a boolean.
    ///
    /// Empty input is no rule at all and evaluates to `None`. The values
    /// mapping is prepared with [`prepare_values`], so its keys may use the
    /// same dashed/keyword names the rule text does.
    pub fn evaluate(
        &self,
        expression: &str,
        values: &ValueMap,
    ) -> Result<Option<bool>, EvalError> {
        if expression.is_empty() {
            return Ok(None);
        }
        let universe = ScalarArgsUniverse {
            inner: SimpleUniverse::weakly_typed(prepare_values(values), self.functions.clone()),
        };
        let evaluator = Evaluator::with_options(universe, self.options())
            .with_rewriter(Box::new(KeywordPrefixRules));
        let value = evaluator.evaluate_expression(expression)?;
        Ok(Some(value.is_truthy()))
    }

    /// Check that a rule is structurally valid without running it.
    pub fn verify(&self, expression: &str) -> Result<(), EvalError> {
        let options = EvaluatorOptions {
            max_depth: self.max_depth,
            ..EvaluatorOptions::default()
        };
        Evaluator::with_options(VerifierUniverse::new(), options)
            .with_rewriter(Box::new(KeywordPrefixRules))
            .evaluate_expression(expression)
            .map(|_| ())
    }

    fn options(&self) -> EvaluatorOptions {
        EvaluatorOptions {
            max_depth: self.max_depth,
            max_time: Some(self.max_time),
            ..EvaluatorOptions::default()
        }
    }
}
