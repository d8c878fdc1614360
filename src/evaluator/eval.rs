//! Core tree-walking logic.

use std::time::Instant;

use ecow::EcoString;
use tracing::trace;

use crate::errors::EvalError;
use crate::evaluator::EvaluatorOptions;
use crate::parser::{self, Node, NodeKind, UnaryOp};
use crate::rewriter::{RewriteRules, rewrite_expression};
use crate::universe::{Thunks, Universe};
use crate::values::{QualifiedName, Value};

/// The sandbox boundary: parses expression text and walks the tree,
/// delegating all semantics to its universe.
///
/// An evaluator is cheap to construct and holds no per-call state; every
/// `evaluate_expression` call gets a fresh depth/time budget, so sequential
/// reuse is pure. For concurrent evaluation, give each thread its own
/// evaluator (universes that are themselves stateless can be shared behind a
/// reference).
pub struct Evaluator<U> {
    universe: U,
    options: EvaluatorOptions,
    rewrite_rules: Option<Box<dyn RewriteRules>>,
}

impl<U: Universe> Evaluator<U> {
    pub fn new(universe: U) -> Self {
        Self::with_options(universe, EvaluatorOptions::default())
    }

    pub fn with_options(universe: U, options: EvaluatorOptions) -> Self {
        Self {
            universe,
            options,
            rewrite_rules: None,
        }
    }

    /// Attach a pre-parse rewriter; see the `rewriter` module.
    pub fn with_rewriter(mut self, rules: Box<dyn RewriteRules>) -> Self {
        self.rewrite_rules = Some(rules);
        self
    }

    pub fn universe(&self) -> &U {
        &self.universe
    }

    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Parse and evaluate a single expression.
    pub fn evaluate_expression(&self, expression: &str) -> Result<Value, EvalError> {
        let rewritten;
        let source = match &self.rewrite_rules {
            Some(rules) => {
                rewritten = rewrite_expression(rules.as_ref(), expression)?;
                rewritten.as_str()
            }
            None => expression,
        };
        trace!(source, "evaluating expression");
        let root = parser::parse(source)?;
        let mut walker = Walker::new(&self.universe, &self.options);
        walker.visit(&root)
    }
}

/// Per-call walk state: the budget plus borrowed universe and options.
pub(crate) struct Walker<'a> {
    universe: &'a dyn Universe,
    options: &'a EvaluatorOptions,
    depth: usize,
    started: Instant,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(universe: &'a dyn Universe, options: &'a EvaluatorOptions) -> Self {
        Self {
            universe,
            options,
            depth: 0,
            started: Instant::now(),
        }
    }

    /// Budget checks, then dispatch. Depth bookkeeping is balanced whether
    /// the handler succeeds or fails.
    pub(crate) fn visit(&mut self, node: &Node) -> Result<Value, EvalError> {
        if self.depth >= self.options.max_depth {
            return Err(EvalError::TooComplex {
                max_depth: self.options.max_depth,
            });
        }
        if let Some(limit) = self.options.max_time {
            if self.started.elapsed() > limit {
                return Err(EvalError::Timeout { limit });
            }
        }
        self.depth += 1;
        let result = self.dispatch(node);
        self.depth -= 1;
        result
    }

    /// The allow-list. Everything a node kind may do is decided here, in one
    /// exhaustive match; kinds without a handler arm are rejected wholesale
    /// before any of their children are visited.
    fn dispatch(&mut self, node: &Node) -> Result<Value, EvalError> {
        match &node.kind {
            NodeKind::Expression(body) => self.visit(body),

            NodeKind::Constant(constant) => {
                if !self.options.constants.allows(constant) {
                    return Err(EvalError::InvalidConstant {
                        kind: constant.type_name(),
                        span: node.span.clone(),
                    });
                }
                Ok(constant.to_value())
            }

            NodeKind::Name(id) => self
                .universe
                .get_value(&QualifiedName::single(id.clone())),

            NodeKind::Attribute { .. } => {
                let name = expand_name(node)?;
                self.universe.get_value(&name)
            }

            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                let NodeKind::Name(name) = &func.kind else {
                    return Err(EvalError::invalid_op(
                        format!("cannot call a {} expression", func.kind.name()),
                        Some(node.span.clone()),
                    ));
                };
                if !keywords.is_empty() {
                    return Err(EvalError::invalid_op(
                        "keyword arguments are not allowed",
                        Some(node.span.clone()),
                    ));
                }
                let universe = self.universe;
                universe.evaluate_function(name, Thunks::new(self, args))
            }

            NodeKind::Compare {
                left,
                ops,
                comparators,
            } => {
                if ops.len() != 1 || comparators.len() != 1 {
                    return Err(EvalError::invalid_op(
                        "only simple comparisons are supported",
                        Some(node.span.clone()),
                    ));
                }
                let op = ops[0];
                let right = &comparators[0];
                let loose = self.options.loose_identity && op.is_identity();
                let (lhs, rhs) = if loose {
                    (self.visit_loose(left)?, self.visit_loose(right)?)
                } else {
                    (self.visit(left)?, self.visit(right)?)
                };
                self.universe.evaluate_binary_op(op, &lhs, &rhs)
            }

            NodeKind::BinOp { op, left, right } => {
                let lhs = self.visit(left)?;
                let rhs = self.visit(right)?;
                self.universe.evaluate_binary_op(*op, &lhs, &rhs)
            }

            NodeKind::BoolOp { op, values } => {
                let universe = self.universe;
                universe.evaluate_bool_op(*op, Thunks::new(self, values))
            }

            NodeKind::UnaryOp { op, operand } => {
                let value = self.visit(operand)?;
                apply_unary(*op, value)
            }

            NodeKind::Tuple(elts) => {
                if !self.options.containers.tuple {
                    return Err(EvalError::invalid_op(
                        "tuple construction is not allowed",
                        Some(node.span.clone()),
                    ));
                }
                let mut items = Vec::with_capacity(elts.len());
                for elt in elts {
                    items.push(self.visit(elt)?);
                }
                Ok(Value::Tuple(items))
            }

            NodeKind::Set(elts) => {
                if !self.options.containers.set {
                    return Err(EvalError::invalid_op(
                        "set construction is not allowed",
                        Some(node.span.clone()),
                    ));
                }
                let mut items: Vec<Value> = Vec::with_capacity(elts.len());
                for elt in elts {
                    let value = self.visit(elt)?;
                    if !items.contains(&value) {
                        items.push(value);
                    }
                }
                Ok(Value::Set(items))
            }

            NodeKind::Subscript { .. } => Err(EvalError::invalid_op(
                "indexing and slicing are not allowed",
                Some(node.span.clone()),
            )),

            NodeKind::List(_)
            | NodeKind::Dict { .. }
            | NodeKind::ListComp
            | NodeKind::SetComp
            | NodeKind::DictComp
            | NodeKind::GeneratorExp
            | NodeKind::FormattedString
            | NodeKind::Lambda
            | NodeKind::IfExp { .. } => Err(EvalError::InvalidNode {
                kind: node.kind.name(),
                span: node.span.clone(),
            }),
        }
    }

    /// Visit an identity-comparison operand, treating an unresolved name as
    /// null. This is the taxonomy's single designed recovery; nothing else
    /// is swallowed.
    fn visit_loose(&mut self, node: &Node) -> Result<Value, EvalError> {
        match self.visit(node) {
            Err(EvalError::NoSuchValue { .. }) => Ok(Value::Null),
            result => result,
        }
    }
}

/// The three unary forms are fixed and universal, so they are applied here
/// instead of being delegated to the universe.
fn apply_unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Plus => match value {
            Value::Int(_) | Value::Float(_) => Ok(value),
            // Booleans count as 1/0 under the numeric unary forms.
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            other => Err(EvalError::InvalidOperands {
                message: format!("bad operand type for unary +: {}", other.type_name()),
            }),
        },
        UnaryOp::Minus => match value {
            Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
            Value::Float(v) => Ok(Value::Float(-v)),
            Value::Bool(b) => Ok(Value::Int(-i64::from(b))),
            other => Err(EvalError::InvalidOperands {
                message: format!("bad operand type for unary -: {}", other.type_name()),
            }),
        },
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
    }
}

/// Collapse an attribute chain into a qualified name, outermost attribute
/// first in the walk, so `foo.bar.quux` becomes `("foo", "bar", "quux")`.
///
/// The chain must bottom out in a bare name: an attribute rooted in a
/// literal or any other expression would require materializing a live value
/// and introspecting it, which the sandbox forbids.
fn expand_name(node: &Node) -> Result<QualifiedName, EvalError> {
    let mut bits: Vec<EcoString> = Vec::new();
    let mut current = node;
    loop {
        match &current.kind {
            NodeKind::Attribute { value, attr } => {
                bits.push(attr.clone());
                current = value;
            }
            NodeKind::Name(id) => {
                bits.push(id.clone());
                break;
            }
            _ => {
                return Err(EvalError::InvalidAttribute {
                    span: node.span.clone(),
                });
            }
        }
    }
    bits.reverse();
    Ok(QualifiedName::from_segments(bits))
}
