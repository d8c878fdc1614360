//! Expression parsing.
//!
//! The grammar lives in `expression.pest` and covers a Python-flavored
//! expression subset. The parser's job ends at producing [`Node`] trees with
//! a closed kind taxonomy; whether a given node kind is *allowed* is decided
//! by the evaluator, never here.

mod node;
pub mod parser;
mod syntax;

pub use node::{Constant, Node, NodeKind};
pub use parser::{ExpressionParser, Rule, parse};
pub use syntax::{BinaryOp, BoolOp, Span, UnaryOp};
