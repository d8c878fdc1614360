//! Token scanner for the pre-parse rewriter.
//!
//! This is not the expression parser's lexer — the parser has its own
//! grammar. The rewriter only needs to see token boundaries and spans, so it
//! can substitute keyword tokens and glue dash-joined identifier runs before
//! the text ever reaches the parser.

use core::ops::Range;

use logos::Logos;

/// Scan failure. Any failure means the rewriter leaves the input alone and
/// lets the parser produce the syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanError {
    #[default]
    UnexpectedCharacter,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = ScanError)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[regex(r"[\p{XID_Start}_]\p{XID_Continue}*")]
    Name,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Str,

    /// Dashes are their own kind so the identifier-gluing pass can spot
    /// `foo-bar` runs without re-inspecting operator text.
    #[token("-")]
    Dash,

    #[regex(r"[+*/%@&|^~=<>!:;,.()\[\]{}]")]
    Op,
}

/// A token plus its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Tokenize the whole input, or fail on the first unscannable character
/// (stray punctuation, unterminated string).
pub fn scan(source: &str) -> Result<Vec<Spanned>, ScanError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(err) => return Err(err),
        }
    }
    Ok(tokens)
}
