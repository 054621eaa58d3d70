use crate::evaluator::EvalError;
use crate::lexer::LexerError;
use crate::parser::ParseError;
use thiserror::Error;

/// Any failure of a single `evaluate` call, tagged by the stage that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LispError {
    #[error("TokenizeError: {0}")]
    Tokenize(#[from] LexerError),
    #[error("ParseError: {0}")]
    Parse(ParseError),
    #[error("EvalError: {0}")]
    Eval(#[from] EvalError),
}

// Lexer failures reached through the parser still count as tokenize errors.
impl From<ParseError> for LispError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::LexerError(lex_err) => LispError::Tokenize(lex_err),
            other => LispError::Parse(other),
        }
    }
}
