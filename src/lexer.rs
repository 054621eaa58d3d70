use logos::Logos;
use std::fmt;
use thiserror::Error;

use crate::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")] // Skip whitespace
#[logos(error = LexerErrorKind)]
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(".")]
    Dot,
    #[token("'")]
    Quote,
    // Operator characters may start a symbol, so `-` and `-5` are both symbols.
    #[regex(r"[a-zA-Z+\-*/][a-zA-Z0-9+\-*/]*", |lex| lex.slice().to_string())]
    Symbol(String),
    #[regex(r"[0-9]+", |lex| {
        let slice = lex.slice();
        slice
            .parse::<i64>()
            .map_err(|_| LexerErrorKind::IntegerOverflow(slice.to_string()))
    })]
    Integer(i64),
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let slice = lex.slice();
        unescape::unescape(&slice[1..slice.len() - 1])
    })]
    String(String),
    /// Text no other kind matches, including a string with no closing
    /// quote. The parser rejects it when it shows up in expression position.
    #[regex(r#""([^"\\]|\\.)*\\?"#, |lex| lex.slice().to_string())]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

mod unescape {
    /// Resolves `\n \r \t \\ \"`. Any other escape is kept as written,
    /// backslash included.
    pub fn unescape(s: &str) -> String {
        // un-escaping should only ever reduce the length of the string.
        let mut result = String::with_capacity(s.len());
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    Some(other) => {
                        result.push('\\');
                        result.push(other);
                    }
                    None => result.push('\\'),
                }
            } else {
                result.push(c);
            }
        }
        result
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Quote => write!(f, "'"),
            TokenKind::Symbol(s) => write!(f, "{}", s),
            TokenKind::Integer(n) => write!(f, "{}", n),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Invalid(s) => write!(f, "{}", s),
        }
    }
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LParen => "left parenthesis",
            TokenKind::RParen => "right parenthesis",
            TokenKind::Dot => "dot",
            TokenKind::Quote => "quote",
            TokenKind::Symbol(_) => "symbol",
            TokenKind::Integer(_) => "integer",
            TokenKind::String(_) => "string",
            TokenKind::Invalid(_) => "invalid",
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Error)]
pub enum LexerErrorKind {
    #[error("integer literal out of range: '{0}'")]
    IntegerOverflow(String),
    /// Raised by logos for text no pattern matches; `tokenize` turns it
    /// into a `TokenKind::Invalid` token instead of failing.
    #[default]
    #[error("invalid token")]
    InvalidToken,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct LexerError {
    pub error: LexerErrorKind,
    pub span: Span,
}

type LexerRangedResult<T> = Result<T, LexerError>;

/// Splits `input` into tokens. Unrecognized characters come back as
/// `TokenKind::Invalid`; only integer literals too large for `i64` fail here.
pub fn tokenize(input: &str) -> LexerRangedResult<Vec<Token>> {
    let tokens = TokenKind::lexer(input)
        .spanned()
        .map(|(result, range)| {
            let span = Span::from(range.clone());
            match result {
                Ok(kind) => Ok(Token { kind, span }),
                Err(LexerErrorKind::InvalidToken) => Ok(Token {
                    kind: TokenKind::Invalid(input[range].to_string()),
                    span,
                }),
                Err(error) => Err(LexerError { error, span }),
            }
        })
        .collect::<LexerRangedResult<Vec<Token>>>()?;
    log::trace!("tokenized {} tokens", tokens.len());
    Ok(tokens)
}
