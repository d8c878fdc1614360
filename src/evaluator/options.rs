//! Configuration options for the evaluator.

use std::time::Duration;

use crate::parser::Constant;

/// Which literal types an expression may contain.
///
/// Booleans are a separate gate, off by default: allowing integers does not
/// implicitly allow `True`/`False`. Boolean *values* produced during
/// evaluation (comparisons, `not`) are never gated — only literals are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantPolicy {
    pub int: bool,
    pub float: bool,
    pub string: bool,
    pub boolean: bool,
    pub null: bool,
}

impl ConstantPolicy {
    pub fn allows(&self, constant: &Constant) -> bool {
        match constant {
            Constant::Int(_) => self.int,
            Constant::Float(_) => self.float,
            Constant::Str(_) => self.string,
            Constant::Bool(_) => self.boolean,
            Constant::Null => self.null,
        }
    }
}

impl Default for ConstantPolicy {
    fn default() -> Self {
        Self {
            int: true,
            float: true,
            string: true,
            boolean: false,
            null: true,
        }
    }
}

/// Which container constructions an expression may perform. Lists and
/// mappings are never constructible; these flags gate the two kinds that can
/// be enabled at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerPolicy {
    pub tuple: bool,
    pub set: bool,
}

impl Default for ContainerPolicy {
    fn default() -> Self {
        Self {
            tuple: true,
            set: true,
        }
    }
}

/// Per-evaluator configuration.
#[derive(Debug, Clone)]
pub struct EvaluatorOptions {
    /// Recursion ceiling for the tree walk, in visited nodes of nesting.
    ///
    /// Default: 10
    pub max_depth: usize,

    /// Optional wall-clock ceiling for one evaluation.
    ///
    /// The budget is checked at each node visit, so it is cooperative: a
    /// single blocking host function is not interrupted mid-flight.
    ///
    /// Default: disabled
    pub max_time: Option<Duration>,

    /// Literal gating; see [`ConstantPolicy`].
    pub constants: ConstantPolicy,

    /// Container-construction gating; see [`ContainerPolicy`].
    pub containers: ContainerPolicy,

    /// When enabled, an unresolved name on either side of `is`/`is not`
    /// evaluates as null instead of failing with NoSuchValue, so identity
    /// comparisons against absent names behave as comparisons against null.
    ///
    /// Default: enabled
    pub loose_identity: bool,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_time: None,
            constants: ConstantPolicy::default(),
            containers: ContainerPolicy::default(),
            loose_identity: true,
        }
    }
}
