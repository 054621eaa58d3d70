use crate::Span;
use crate::lexer::{LexerError, Token, TokenKind};
use crate::types::Expr;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected {} '{}' at [{}], expected {expected}", .found.kind.name(), .found.kind, .found.span)]
    UnexpectedToken { found: Token, expected: String },
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(String),
    #[error("malformed dotted list at [{0}]")]
    InvalidDotSyntax(Span),
    #[error("quoted empty expression at [{0}]")]
    EmptyQuote(Span),
    #[error("no expression to evaluate")]
    EmptyInput,
    #[error(transparent)]
    LexerError(#[from] LexerError),
}

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    pub fn is_empty(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    /// Parses a single expression from the token stream.
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        match self.next_token() {
            Some(token) => self.parse_expr_with_token(token),
            None => Err(ParseError::UnexpectedEof("an expression".to_string())),
        }
    }

    fn parse_expr_with_token(&mut self, token: Token) -> ParseResult<Expr> {
        match token.kind {
            TokenKind::LParen => self.parse_list(),
            TokenKind::Quote => self.parse_quoted(token.span),
            TokenKind::Dot => Ok(Expr::Dot),
            TokenKind::Symbol(name) => Ok(Expr::symbol(&name)),
            TokenKind::String(s) => Ok(Expr::String(s)),
            TokenKind::Integer(n) => Ok(Expr::Integer(n)),
            TokenKind::RParen | TokenKind::Invalid(_) => Err(ParseError::UnexpectedToken {
                found: token,
                expected: "an expression".to_string(),
            }),
        }
    }

    /// Parses the rest of a list after its `(`.
    fn parse_list(&mut self) -> ParseResult<Expr> {
        let mut items = Vec::new();
        loop {
            let token = self
                .next_token()
                .ok_or_else(|| ParseError::UnexpectedEof("')'".to_string()))?;
            match token.kind {
                TokenKind::RParen => return Ok(Expr::list(items)),
                TokenKind::Dot if items.is_empty() => {
                    return Err(ParseError::InvalidDotSyntax(token.span));
                }
                TokenKind::Dot => {
                    let tail = self.parse_dotted_tail(token.span)?;
                    return Ok(Expr::list_with_tail(items, tail));
                }
                _ => items.push(self.parse_expr_with_token(token)?),
            }
        }
    }

    // Exactly one expression must follow the dot, then the list closes.
    fn parse_dotted_tail(&mut self, dot_span: Span) -> ParseResult<Expr> {
        let tail = match self.next_token() {
            Some(Token {
                kind: TokenKind::RParen | TokenKind::Dot,
                span,
            }) => return Err(ParseError::InvalidDotSyntax(dot_span.merge(span))),
            Some(token) => self.parse_expr_with_token(token)?,
            None => {
                return Err(ParseError::UnexpectedEof(
                    "an expression after '.'".to_string(),
                ));
            }
        };

        match self.next_token() {
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => Ok(tail),
            Some(token) => Err(ParseError::InvalidDotSyntax(dot_span.merge(token.span))),
            None => Err(ParseError::UnexpectedEof(
                "')' after dotted pair".to_string(),
            )),
        }
    }

    /// Parses one or more quote markers and the expression they apply to.
    fn parse_quoted(&mut self, quote_span: Span) -> ParseResult<Expr> {
        let mut depth = 1;
        let mut last_span = quote_span;
        while let Some(Token {
            kind: TokenKind::Quote,
            span,
        }) = self.tokens.peek()
        {
            depth += 1;
            last_span = *span;
            self.next_token();
        }
        if self.is_empty() {
            return Err(ParseError::EmptyQuote(quote_span.merge(last_span)));
        }

        let quoted_expr = self.parse_expr()?;
        Ok((0..depth).fold(quoted_expr, |inner, _| Expr::quoted(inner)))
    }

    /// Parses every top-level expression left in the stream.
    pub fn parse(mut self) -> ParseResult<Vec<Expr>> {
        let mut expressions = Vec::new();
        while !self.is_empty() {
            expressions.push(self.parse_expr()?);
        }
        Ok(expressions)
    }
}

/// Tokenizes and parses a whole program.
pub fn parse_str(input: &str) -> ParseResult<Vec<Expr>> {
    let tokens = crate::lexer::tokenize(input)?;
    Parser::new(tokens).parse()
}
