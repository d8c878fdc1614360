use ecow::EcoString;

use crate::parser::{BinaryOp, BoolOp, Span, UnaryOp};
use crate::values::Value;

/// A parse-tree node: a kind tag plus the source span it covers.
///
/// The kind set is closed on purpose. The evaluator dispatches on it with an
/// exhaustive match, so the set of reachable operations is auditable in one
/// place rather than spread over whatever handlers happen to exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Top-level wrapper around the parsed expression body.
    Expression(Box<Node>),
    Constant(Constant),
    Name(EcoString),
    Attribute {
        value: Box<Node>,
        attr: EcoString,
    },
    Call {
        func: Box<Node>,
        args: Vec<Node>,
        keywords: Vec<(EcoString, Node)>,
    },
    /// A comparison with one or more operators. `5 < x < 11` produces a
    /// single node with two operators; the evaluator rejects chains.
    Compare {
        left: Box<Node>,
        ops: Vec<BinaryOp>,
        comparators: Vec<Node>,
    },
    BinOp {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Node>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Tuple(Vec<Node>),
    Set(Vec<Node>),
    List(Vec<Node>),
    Dict {
        keys: Vec<Node>,
        values: Vec<Node>,
    },
    Subscript {
        value: Box<Node>,
    },
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    FormattedString,
    Lambda,
    IfExp {
        test: Box<Node>,
        body: Box<Node>,
        orelse: Box<Node>,
    },
}

impl NodeKind {
    /// Name of the node kind, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Expression(_) => "Expression",
            NodeKind::Constant(_) => "Constant",
            NodeKind::Name(_) => "Name",
            NodeKind::Attribute { .. } => "Attribute",
            NodeKind::Call { .. } => "Call",
            NodeKind::Compare { .. } => "Compare",
            NodeKind::BinOp { .. } => "BinOp",
            NodeKind::BoolOp { .. } => "BoolOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::Tuple(_) => "Tuple",
            NodeKind::Set(_) => "Set",
            NodeKind::List(_) => "List",
            NodeKind::Dict { .. } => "Dict",
            NodeKind::Subscript { .. } => "Subscript",
            NodeKind::ListComp => "ListComp",
            NodeKind::SetComp => "SetComp",
            NodeKind::DictComp => "DictComp",
            NodeKind::GeneratorExp => "GeneratorExp",
            NodeKind::FormattedString => "FormattedString",
            NodeKind::Lambda => "Lambda",
            NodeKind::IfExp { .. } => "IfExp",
        }
    }
}

/// A literal constant as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Str(EcoString),
    Bool(bool),
    Null,
}

impl Constant {
    pub fn type_name(&self) -> &'static str {
        match self {
            Constant::Int(_) => "int",
            Constant::Float(_) => "float",
            Constant::Str(_) => "str",
            Constant::Bool(_) => "bool",
            Constant::Null => "null",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Constant::Int(v) => Value::Int(*v),
            Constant::Float(v) => Value::Float(*v),
            Constant::Str(s) => Value::Str(s.clone()),
            Constant::Bool(b) => Value::Bool(*b),
            Constant::Null => Value::Null,
        }
    }
}
