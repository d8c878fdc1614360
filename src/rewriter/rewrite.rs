use std::collections::HashSet;

use lazy_static::lazy_static;
use tracing::debug;

use crate::errors::EvalError;
use crate::rewriter::lexer::{Spanned, Token, scan};

/// Keyword-like words that stay usable in expressions: literals the grammar
/// needs, the boolean/comparison operators, and `for` (which must remain
/// reserved so comprehension syntax still parses — and is then rejected by
/// the evaluator rather than silently renamed).
pub const EXPRESSION_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "for", "in", "is", "not", "or",
];

lazy_static! {
    static ref RESERVED_WORDS: HashSet<&'static str> = [
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield",
    ]
    .into_iter()
    .collect();
}

/// True if `word` is reserved by the grammar and unusable as a plain name.
pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}

/// Strategy hooks for the pre-parse rewrite.
pub trait RewriteRules {
    /// Replacement text for a reserved keyword used as a name.
    ///
    /// The replacement may be any expression fragment (a prefixed name, a
    /// call, ...). The default refuses, forcing configurations to opt in.
    fn rewrite_keyword(&self, keyword: &str) -> Result<String, EvalError> {
        Err(EvalError::Syntax {
            message: format!("keyword {keyword:?} can not be used"),
        })
    }

    /// Separator used to glue dash-joined identifier runs (`foo-bar` →
    /// `foo<sep>bar`). `None` disables the gluing pass.
    fn dash_separator(&self) -> Option<&str> {
        None
    }
}

/// The do-nothing strategy: every disallowed keyword is refused, dashes are
/// not glued.
pub struct RefuseKeywords;

impl RewriteRules for RefuseKeywords {}

/// Rewrite an expression before parsing.
///
/// The output is the input text with only the rewritten token ranges
/// spliced, so an expression with nothing to rewrite round-trips
/// byte-identically. Input the scanner cannot tokenize is returned unchanged
/// — the parser is the one that reports the syntax error.
pub fn rewrite_expression(rules: &dyn RewriteRules, source: &str) -> Result<String, EvalError> {
    let tokens = match scan(source) {
        Ok(tokens) => tokens,
        Err(_) => return Ok(source.to_string()),
    };

    let mut out = String::new();
    let mut cursor = 0usize;
    let mut index = 0usize;
    while index < tokens.len() {
        let tok = &tokens[index];
        if tok.token != Token::Name {
            index += 1;
            continue;
        }

        if let Some(separator) = rules.dash_separator() {
            let end = dash_run_end(&tokens, index);
            let run = &tokens[index..end];
            if run.len() > 1 {
                if run[run.len() - 1].token == Token::Dash {
                    // A run ending in a dangling dash is left unglued; the
                    // parse fails downstream instead of silently truncating
                    // the name. Keyword substitution still applies to the
                    // names inside it.
                    for part in run {
                        if part.token == Token::Name {
                            splice_keyword(rules, source, part, &mut out, &mut cursor)?;
                        }
                    }
                } else {
                    let glued = glue_run(rules, source, run, separator)?;
                    out.push_str(&source[cursor..run[0].span.start]);
                    out.push_str(&glued);
                    cursor = run[run.len() - 1].span.end;
                }
                index = end;
                continue;
            }
        }

        splice_keyword(rules, source, tok, &mut out, &mut cursor)?;
        index += 1;
    }
    out.push_str(&source[cursor..]);

    if out != source {
        debug!(original = source, rewritten = out.as_str(), "rewrote expression");
    }
    Ok(out)
}

/// Substitute a standalone name token if it is a reserved word outside the
/// always-allowed expression set.
fn splice_keyword(
    rules: &dyn RewriteRules,
    source: &str,
    tok: &Spanned,
    out: &mut String,
    cursor: &mut usize,
) -> Result<(), EvalError> {
    let text = &source[tok.span.clone()];
    if is_reserved(text) && !EXPRESSION_KEYWORDS.contains(&text) {
        let replacement = rules.rewrite_keyword(text)?;
        out.push_str(&source[*cursor..tok.span.start]);
        out.push_str(&replacement);
        *cursor = tok.span.end;
    }
    Ok(())
}

/// Extend a run of lexically contiguous name/integer/dash tokens starting at
/// `start` (which must be a name). Whitespace between tokens ends the run,
/// as does any other token kind — notably floats, which cannot appear inside
/// an identifier.
fn dash_run_end(tokens: &[Spanned], start: usize) -> usize {
    let mut end = start + 1;
    while end < tokens.len() {
        let prev = &tokens[end - 1];
        let tok = &tokens[end];
        if tok.span.start != prev.span.end {
            break;
        }
        if !matches!(tok.token, Token::Name | Token::Int | Token::Dash) {
            break;
        }
        end += 1;
    }
    end
}

/// Glue a dash run into one identifier: name and integer parts keep their
/// text, dashes become the separator. Reserved words inside a glued name are
/// always keyword-substituted — including the expression keywords, since as
/// name *parts* they have no grammatical role to preserve.
fn glue_run(
    rules: &dyn RewriteRules,
    source: &str,
    run: &[Spanned],
    separator: &str,
) -> Result<String, EvalError> {
    let mut glued = String::new();
    for tok in run {
        match tok.token {
            Token::Name => {
                let text = &source[tok.span.clone()];
                if is_reserved(text) {
                    glued.push_str(&rules.rewrite_keyword(text)?);
                } else {
                    glued.push_str(text);
                }
            }
            Token::Int => glued.push_str(&source[tok.span.clone()]),
            Token::Dash => glued.push_str(separator),
            _ => {
                return Err(EvalError::Syntax {
                    message: "invalid token in dashed identifier".into(),
                });
            }
        }
    }
    Ok(glued)
}
