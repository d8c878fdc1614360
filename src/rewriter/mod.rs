//! Pre-parse expression rewriting.
//!
//! Lets otherwise-reserved keywords and dash-joined words be used as plain
//! names by transforming the token stream before the parser sees the text.
//! The transform is purely textual: tokens are located with their spans and
//! only the rewritten ranges are spliced, so untouched input passes through
//! byte-for-byte.

pub mod lexer;
mod rewrite;

pub use rewrite::{
    EXPRESSION_KEYWORDS, RefuseKeywords, RewriteRules, is_reserved, rewrite_expression,
};

#[cfg(test)]
mod rewrite_test;
