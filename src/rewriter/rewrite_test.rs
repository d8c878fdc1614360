//! Unit tests for expression rewriting.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::errors::EvalError;
use crate::evaluator::Evaluator;
use crate::parser::{BinaryOp, BoolOp};
use crate::rewriter::{RefuseKeywords, RewriteRules, rewrite_expression};
use crate::universe::{FunctionMap, HostFunction, SimpleUniverse, Thunks, Universe, ValueMap};
use crate::values::{QualifiedName, Value};

struct PrefixRules;

impl RewriteRules for PrefixRules {
    fn rewrite_keyword(&self, keyword: &str) -> Result<String, EvalError> {
        Ok(format!("kw_{keyword}"))
    }
}

struct CallRules;

impl RewriteRules for CallRules {
    fn rewrite_keyword(&self, keyword: &str) -> Result<String, EvalError> {
        Ok(format!("get_value('{keyword}')"))
    }
}

struct GlueRules;

impl RewriteRules for GlueRules {
    fn rewrite_keyword(&self, keyword: &str) -> Result<String, EvalError> {
        Ok(format!("kw_{keyword}"))
    }

    fn dash_separator(&self) -> Option<&str> {
        Some("__")
    }
}

fn rewrite(rules: &dyn RewriteRules, source: &str) -> String {
    rewrite_expression(rules, source).expect("rewrite failed")
}

// ============================================================================
// Keyword substitution
// ============================================================================

#[test]
fn test_round_trip_without_keywords() {
    let source = "abs(foo + 10) > 5  and x.y == 'a-b'";
    assert_eq!(rewrite(&PrefixRules, source), source);
}

#[test]
fn test_keyword_substitution() {
    assert_eq!(
        rewrite(&PrefixRules, "continue * break - def + break"),
        "kw_continue * kw_break - kw_def + kw_break"
    );
}

#[test]
fn test_expression_keywords_are_kept() {
    let source = "a and not b or c in d";
    assert_eq!(rewrite(&PrefixRules, source), source);
}

#[test]
fn test_strings_are_not_rewritten() {
    assert_eq!(rewrite(&PrefixRules, "\"continue\""), "\"continue\"");
}

#[test]
fn test_default_rules_refuse_keywords() {
    assert!(matches!(
        rewrite_expression(&RefuseKeywords, "class + 1"),
        Err(EvalError::Syntax { .. })
    ));
}

#[test]
fn test_untokenizable_input_passes_through() {
    assert_eq!(rewrite(&PrefixRules, "'''"), "'''");
    assert_eq!(rewrite(&PrefixRules, "a $ b"), "a $ b");
}

// ============================================================================
// Keyword substitution through the evaluator
// ============================================================================

#[test]
fn test_prefix_rewriter_evaluation() {
    let values = ValueMap::from([
        ("kw_continue".into(), Value::Int(8)),
        ("kw_break".into(), Value::Int(5)),
        ("kw_def".into(), Value::Int(3)),
    ]);
    let evaluator = Evaluator::new(SimpleUniverse::new(values, FunctionMap::new()))
        .with_rewriter(Box::new(PrefixRules));
    assert_eq!(
        evaluator
            .evaluate_expression("continue * break - def + break")
            .unwrap(),
        Value::Int(42)
    );
}

/// A universe that strips the rewriter's prefix off every name segment
/// before resolving, so hosts can keep their mappings in original terms.
struct UndoPrefix {
    inner: SimpleUniverse,
}

impl Universe for UndoPrefix {
    fn get_value(&self, name: &QualifiedName) -> Result<Value, EvalError> {
        let undone = QualifiedName::from_segments(
            name.segments()
                .iter()
                .map(|segment| segment.strip_prefix("kw_").unwrap_or(segment.as_str())),
        );
        self.inner.get_value(&undone)
    }

    fn evaluate_function(
        &self,
        name: &str,
        args: Thunks<'_, '_, '_>,
    ) -> Result<Value, EvalError> {
        self.inner.evaluate_function(name, args)
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

#[test]
fn test_prefix_rewriting_reaches_attribute_chains() {
    let values = ValueMap::from([
        (["def", "break"].into(), Value::Int(128)),
        ("continue".into(), Value::Int(8)),
        ("zoop".into(), Value::Int(1)),
    ]);
    let universe = UndoPrefix {
        inner: SimpleUniverse::new(values, FunctionMap::new()),
    };
    let evaluator = Evaluator::new(universe).with_rewriter(Box::new(PrefixRules));
    // Rewritten to `kw_def.kw_break * kw_continue + zoop`; the universe
    // undoes the prefixes.
    assert_eq!(
        evaluator
            .evaluate_expression("def.break * continue + zoop")
            .unwrap(),
        Value::Int(1025)
    );
}

#[test]
fn test_call_shaped_replacements() {
    let functions = FunctionMap::from([(
        "get_value".to_string(),
        Arc::new(|args: &[Value]| {
            let [Value::Str(key)] = args else {
                return Err(EvalError::InvalidOperands {
                    message: "get_value() wants one string".into(),
                });
            };
            match key.as_str() {
                "continue" => Ok(Value::Int(8)),
                "break" => Ok(Value::Int(5)),
                "def" => Ok(Value::Int(3)),
                other => Err(EvalError::InvalidOperands {
                    message: format!("unknown keyword {other:?}"),
                }),
            }
        }) as HostFunction,
    )]);
    let evaluator = Evaluator::new(SimpleUniverse::new(ValueMap::new(), functions))
        .with_rewriter(Box::new(CallRules));
    assert_eq!(
        evaluator
            .evaluate_expression("continue * break + break - def")
            .unwrap(),
        Value::Int(42)
    );
}

#[test]
fn test_rewriter_is_not_applied_inside_strings() {
    let evaluator = Evaluator::new(SimpleUniverse::new(ValueMap::new(), FunctionMap::new()))
        .with_rewriter(Box::new(CallRules));
    assert_eq!(
        evaluator.evaluate_expression("'continue'").unwrap(),
        Value::str("continue")
    );
}

#[test]
fn test_rewriter_with_boolean_values() {
    let values = ValueMap::from([
        ("quit".into(), Value::Bool(false)),
        ("kw_continue".into(), Value::Bool(true)),
    ]);
    let evaluator = Evaluator::new(SimpleUniverse::new(values, FunctionMap::new()))
        .with_rewriter(Box::new(PrefixRules));
    assert_eq!(
        evaluator.evaluate_expression("quit or continue").unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_rewrite_parse_errors_degrade_to_syntax_errors() {
    let evaluator = Evaluator::new(SimpleUniverse::new(ValueMap::new(), FunctionMap::new()))
        .with_rewriter(Box::new(PrefixRules));
    for source in ["'''", "try:\nthere is no try"] {
        assert!(
            matches!(
                evaluator.evaluate_expression(source),
                Err(EvalError::Syntax { .. })
            ),
            "expected syntax error for {source:?}"
        );
    }
}

// ============================================================================
// Dashed identifiers
// ============================================================================

#[test]
fn test_dash_conversion_cases() {
    for (source, expected) in [
        // Whitespace around the dash keeps it a subtraction.
        ("hello - world", "hello - world"),
        ("foo-bar-baz-quux", "foo__bar__baz__quux"),
        ("foo-3bar-baz-quux", "foo__3bar__baz__quux"),
        ("foo-bar+baz-quux", "foo__bar+baz__quux"),
        ("foo-bar =='barf-glarf'", "foo__bar =='barf-glarf'"),
        // A trailing dash leaves the run untouched; the parse fails later
        // instead of silently truncating the name.
        ("foo-bar-baz- == 8", "foo-bar-baz- == 8"),
        // Floats cannot appear inside an identifier.
        ("foo-3.9bar", "foo-3.9bar"),
    ] {
        assert_eq!(rewrite(&GlueRules, source), expected, "case {source:?}");
    }
}

#[test]
fn test_trailing_dash_output_fails_to_parse() {
    let rewritten = rewrite(&GlueRules, "foo-bar-baz- == 8");
    assert!(matches!(
        crate::parser::parse(&rewritten),
        Err(EvalError::Syntax { .. })
    ));
}

#[test]
fn test_reserved_parts_inside_glued_names_are_substituted() {
    assert_eq!(rewrite(&GlueRules, "error-class"), "error__kw_class");
}

#[test]
fn test_glued_names_evaluate() {
    let values = ValueMap::from([("foo__bar".into(), Value::Int(9))]);
    let evaluator = Evaluator::new(SimpleUniverse::new(values, FunctionMap::new()))
        .with_rewriter(Box::new(GlueRules));
    assert_eq!(
        evaluator.evaluate_expression("foo-bar > 8").unwrap(),
        Value::Bool(true)
    );
}
