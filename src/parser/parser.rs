use ecow::EcoString;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::errors::EvalError;
use crate::parser::node::{Constant, Node, NodeKind};
use crate::parser::{BinaryOp, BoolOp, Span, UnaryOp};

#[derive(Parser)]
#[grammar = "parser/expression.pest"]
pub struct ExpressionParser;

/// Maximum bracket nesting accepted before parsing.
///
/// The generated parser recurses on nested brackets, so pathological inputs
/// like ten thousand opening parentheses must be refused up front rather than
/// exhaust the parse stack. Deep-but-reasonable expressions are still caught
/// later by the evaluator's own depth budget.
const MAX_NESTING: usize = 200;

impl From<pest::error::Error<Rule>> for EvalError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        EvalError::Syntax {
            message: err.variant.message().into_owned(),
        }
    }
}

fn malformed(what: &str) -> EvalError {
    EvalError::Syntax {
        message: format!("malformed parse tree: missing {what}"),
    }
}

/// Parse a single expression into its tree, wrapped in an `Expression` node.
pub fn parse(source: &str) -> Result<Node, EvalError> {
    check_nesting(source)?;
    let mut pairs = ExpressionParser::parse(Rule::main, source)?;
    let main = pairs.next().ok_or_else(|| malformed("main"))?;
    let expr = main
        .into_inner()
        .next()
        .ok_or_else(|| malformed("expression"))?;
    let body = build_expr(expr)?;
    Ok(Node::new(
        NodeKind::Expression(Box::new(body)),
        Span::new(0, source.len()),
    ))
}

/// Refuse input whose bracket nesting exceeds [`MAX_NESTING`].
///
/// Quoted sections are skipped so that bracket characters inside string
/// literals don't count.
fn check_nesting(source: &str) -> Result<(), EvalError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in source.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(EvalError::Syntax {
                        message: format!("expression nesting exceeds {MAX_NESTING} levels"),
                    });
                }
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn build_expr(pair: Pair<Rule>) -> Result<Node, EvalError> {
    let span = Span::from(pair.as_span());
    match pair.as_rule() {
        // Wrappers that hold exactly one interesting child.
        Rule::expression | Rule::atom | Rule::number | Rule::group => {
            let inner = pair.into_inner().next().ok_or_else(|| malformed("child"))?;
            build_expr(inner)
        }

        Rule::ternary => build_ternary(pair, span),
        Rule::or_test => build_bool_chain(pair, BoolOp::Or, span),
        Rule::and_test => build_bool_chain(pair, BoolOp::And, span),
        Rule::not_test => build_not(pair, span),
        Rule::comparison => build_comparison(pair, span),
        Rule::arith | Rule::term => build_binary_chain(pair),
        Rule::factor => build_factor(pair, span),
        Rule::power => build_power(pair),
        Rule::postfix => build_postfix(pair),

        Rule::lambda => Ok(Node::new(NodeKind::Lambda, span)),
        Rule::genexp => Ok(Node::new(NodeKind::GeneratorExp, span)),
        Rule::list_comp => Ok(Node::new(NodeKind::ListComp, span)),
        Rule::set_comp => Ok(Node::new(NodeKind::SetComp, span)),
        Rule::dict_comp => Ok(Node::new(NodeKind::DictComp, span)),
        Rule::fstring => Ok(Node::new(NodeKind::FormattedString, span)),

        Rule::tuple_lit => {
            let elts = pair
                .into_inner()
                .map(build_expr)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::new(NodeKind::Tuple(elts), span))
        }
        Rule::list_lit => {
            let elts = pair
                .into_inner()
                .map(build_expr)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::new(NodeKind::List(elts), span))
        }
        Rule::set_lit => {
            let elts = pair
                .into_inner()
                .map(build_expr)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::new(NodeKind::Set(elts), span))
        }
        Rule::dict_lit => {
            let mut keys = Vec::new();
            let mut values = Vec::new();
            for entry in pair.into_inner() {
                let mut kv = entry.into_inner();
                let key = kv.next().ok_or_else(|| malformed("dict key"))?;
                let value = kv.next().ok_or_else(|| malformed("dict value"))?;
                keys.push(build_expr(key)?);
                values.push(build_expr(value)?);
            }
            Ok(Node::new(NodeKind::Dict { keys, values }, span))
        }

        Rule::strings => {
            let mut text = String::new();
            for part in pair.into_inner() {
                let raw = part.as_str();
                text.push_str(&unescape(&raw[1..raw.len() - 1]));
            }
            Ok(Node::new(
                NodeKind::Constant(Constant::Str(EcoString::from(text))),
                span,
            ))
        }
        Rule::integer => {
            let value: i64 = pair.as_str().parse().map_err(|_| EvalError::Syntax {
                message: format!("invalid integer literal {:?}", pair.as_str()),
            })?;
            Ok(Node::new(NodeKind::Constant(Constant::Int(value)), span))
        }
        Rule::float => {
            let value: f64 = pair.as_str().parse().map_err(|_| EvalError::Syntax {
                message: format!("invalid float literal {:?}", pair.as_str()),
            })?;
            Ok(Node::new(NodeKind::Constant(Constant::Float(value)), span))
        }
        Rule::boolean => {
            let value = pair.as_str() == "True";
            Ok(Node::new(NodeKind::Constant(Constant::Bool(value)), span))
        }
        Rule::none => Ok(Node::new(NodeKind::Constant(Constant::Null), span)),
        Rule::ident => Ok(Node::new(NodeKind::Name(EcoString::from(pair.as_str())), span)),

        rule => Err(EvalError::Syntax {
            message: format!("unhandled grammar rule {rule:?}"),
        }),
    }
}

fn build_ternary(pair: Pair<Rule>, span: Span) -> Result<Node, EvalError> {
    let mut inner = pair.into_inner();
    let body = build_expr(inner.next().ok_or_else(|| malformed("ternary body"))?)?;
    // No `if` part: plain pass-through.
    let Some(next) = inner.next() else {
        return Ok(body);
    };
    debug_assert_eq!(next.as_rule(), Rule::kw_if);
    let test = build_expr(inner.next().ok_or_else(|| malformed("ternary test"))?)?;
    let _else = inner.next(); // kw_else
    let orelse = build_expr(inner.next().ok_or_else(|| malformed("ternary else"))?)?;
    Ok(Node::new(
        NodeKind::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        },
        span,
    ))
}

/// `a or b or c` flattens into one variadic node, mirroring the external
/// taxonomy the evaluator dispatches on.
fn build_bool_chain(pair: Pair<Rule>, op: BoolOp, span: Span) -> Result<Node, EvalError> {
    let mut values = Vec::new();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::kw_or | Rule::kw_and => {}
            _ => values.push(build_expr(part)?),
        }
    }
    if values.len() == 1 {
        return values.pop().ok_or_else(|| malformed("operand"));
    }
    Ok(Node::new(NodeKind::BoolOp { op, values }, span))
}

fn build_not(pair: Pair<Rule>, span: Span) -> Result<Node, EvalError> {
    let mut inner = pair.into_inner();
    let first = inner.next().ok_or_else(|| malformed("operand"))?;
    if first.as_rule() != Rule::not_op {
        return build_expr(first);
    }
    let operand = build_expr(inner.next().ok_or_else(|| malformed("operand"))?)?;
    Ok(Node::new(
        NodeKind::UnaryOp {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        },
        span,
    ))
}

fn build_comparison(pair: Pair<Rule>, span: Span) -> Result<Node, EvalError> {
    let mut inner = pair.into_inner();
    let left = build_expr(inner.next().ok_or_else(|| malformed("operand"))?)?;
    let mut ops = Vec::new();
    let mut comparators = Vec::new();
    while let Some(op_pair) = inner.next() {
        ops.push(comparison_op(op_pair)?);
        let operand = inner.next().ok_or_else(|| malformed("operand"))?;
        comparators.push(build_expr(operand)?);
    }
    if ops.is_empty() {
        return Ok(left);
    }
    Ok(Node::new(
        NodeKind::Compare {
            left: Box::new(left),
            ops,
            comparators,
        },
        span,
    ))
}

fn comparison_op(pair: Pair<Rule>) -> Result<BinaryOp, EvalError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| malformed("comparison operator"))?;
    Ok(match inner.as_rule() {
        Rule::eq => BinaryOp::Eq,
        Rule::ne => BinaryOp::NotEq,
        Rule::le => BinaryOp::LtE,
        Rule::ge => BinaryOp::GtE,
        Rule::lt => BinaryOp::Lt,
        Rule::gt => BinaryOp::Gt,
        Rule::in_op => BinaryOp::In,
        Rule::not_in => BinaryOp::NotIn,
        Rule::is_op => BinaryOp::Is,
        Rule::is_not => BinaryOp::IsNot,
        rule => {
            return Err(EvalError::Syntax {
                message: format!("unhandled comparison operator {rule:?}"),
            });
        }
    })
}

/// Left-associative fold over `operand (op operand)*` pairs.
fn build_binary_chain(pair: Pair<Rule>) -> Result<Node, EvalError> {
    let mut inner = pair.into_inner();
    let mut left = build_expr(inner.next().ok_or_else(|| malformed("operand"))?)?;
    while let Some(op_pair) = inner.next() {
        let op = binary_op(op_pair)?;
        let right = build_expr(inner.next().ok_or_else(|| malformed("operand"))?)?;
        let span = Span::combine(&left.span, &right.span);
        left = Node::new(
            NodeKind::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        );
    }
    Ok(left)
}

fn binary_op(pair: Pair<Rule>) -> Result<BinaryOp, EvalError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| malformed("binary operator"))?;
    Ok(match inner.as_rule() {
        Rule::add => BinaryOp::Add,
        Rule::sub => BinaryOp::Sub,
        Rule::mul => BinaryOp::Mul,
        Rule::div => BinaryOp::Div,
        Rule::floordiv => BinaryOp::FloorDiv,
        Rule::rem => BinaryOp::Mod,
        rule => {
            return Err(EvalError::Syntax {
                message: format!("unhandled binary operator {rule:?}"),
            });
        }
    })
}

fn build_factor(pair: Pair<Rule>, span: Span) -> Result<Node, EvalError> {
    let mut inner = pair.into_inner();
    let first = inner.next().ok_or_else(|| malformed("operand"))?;
    if first.as_rule() != Rule::sign {
        return build_expr(first);
    }
    let op = match first.into_inner().next().map(|p| p.as_rule()) {
        Some(Rule::add) => UnaryOp::Plus,
        Some(Rule::sub) => UnaryOp::Minus,
        _ => return Err(malformed("sign")),
    };
    let operand = build_expr(inner.next().ok_or_else(|| malformed("operand"))?)?;
    Ok(Node::new(
        NodeKind::UnaryOp {
            op,
            operand: Box::new(operand),
        },
        span,
    ))
}

fn build_power(pair: Pair<Rule>) -> Result<Node, EvalError> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let base = build_expr(inner.next().ok_or_else(|| malformed("operand"))?)?;
    let Some(op_pair) = inner.next() else {
        return Ok(base);
    };
    debug_assert_eq!(op_pair.as_rule(), Rule::dstar);
    let exponent = build_expr(inner.next().ok_or_else(|| malformed("exponent"))?)?;
    Ok(Node::new(
        NodeKind::BinOp {
            op: BinaryOp::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
        },
        span,
    ))
}

/// Fold call, subscript and attribute trailers onto the atom, left to right.
fn build_postfix(pair: Pair<Rule>) -> Result<Node, EvalError> {
    let start = Span::from(pair.as_span()).0.start;
    let mut inner = pair.into_inner();
    let mut node = build_expr(inner.next().ok_or_else(|| malformed("atom"))?)?;
    for trailer in inner {
        let end = trailer.as_span().end();
        let span = Span::new(start, end);
        let part = trailer
            .into_inner()
            .next()
            .ok_or_else(|| malformed("trailer"))?;
        node = match part.as_rule() {
            Rule::call_op => build_call(node, part, span)?,
            Rule::index_op => Node::new(
                NodeKind::Subscript {
                    value: Box::new(node),
                },
                span,
            ),
            Rule::attr_op => {
                let ident = part
                    .into_inner()
                    .next()
                    .ok_or_else(|| malformed("attribute name"))?;
                Node::new(
                    NodeKind::Attribute {
                        value: Box::new(node),
                        attr: EcoString::from(ident.as_str()),
                    },
                    span,
                )
            }
            rule => {
                return Err(EvalError::Syntax {
                    message: format!("unhandled trailer {rule:?}"),
                });
            }
        };
    }
    Ok(node)
}

fn build_call(func: Node, pair: Pair<Rule>, span: Span) -> Result<Node, EvalError> {
    let mut args = Vec::new();
    let mut keywords = Vec::new();
    if let Some(arg_list) = pair.into_inner().next() {
        for argument in arg_list.into_inner() {
            let part = argument
                .into_inner()
                .next()
                .ok_or_else(|| malformed("argument"))?;
            match part.as_rule() {
                Rule::kwarg => {
                    let mut kv = part.into_inner();
                    let name = kv.next().ok_or_else(|| malformed("keyword name"))?;
                    let value = kv.next().ok_or_else(|| malformed("keyword value"))?;
                    keywords.push((EcoString::from(name.as_str()), build_expr(value)?));
                }
                _ => args.push(build_expr(part)?),
            }
        }
    }
    Ok(Node::new(
        NodeKind::Call {
            func: Box::new(func),
            args,
            keywords,
        },
        span,
    ))
}

/// Process backslash escapes in a string literal body. Unknown escapes keep
/// the backslash, matching the source language's behavior.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
