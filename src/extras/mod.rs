//! Higher-level conveniences built on the core pieces.

mod rules;

pub use rules::{
    DASH_SEPARATOR, KEYWORD_PREFIX, KeywordPrefixRules, RuleEvaluator, prepare_name,
    prepare_values,
};
