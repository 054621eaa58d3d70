pub mod command;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod pretty_print;
pub mod primitives;
pub mod source;
pub mod types;

pub use command::LispCommand;
pub use environment::{Env, EnvError, Environment};
pub use error::LispError;
pub use evaluator::{EvalError, EvalResult};
pub use lexer::{LexerError, Token, TokenKind, tokenize};
pub use parser::{ParseError, Parser, parse_str};
pub use source::Span;
pub use types::{Expr, Symbol};

/// Evaluates `source` in `env` and returns the value of its last top-level
/// expression.
///
/// The whole text is tokenized and parsed before anything runs, so a syntax
/// error anywhere means no expression is evaluated. Bindings made with `setq`
/// at the top level land in `env` and stay there for later calls.
pub fn evaluate(env: &Env, source: &str) -> Result<Expr, LispError> {
    let tokens = tokenize(source)?;
    let expressions = Parser::new(tokens).parse()?;
    if expressions.is_empty() {
        return Err(ParseError::EmptyInput.into());
    }

    log::debug!("evaluating {} top-level expression(s)", expressions.len());
    let mut result = Expr::Nil;
    for expr in &expressions {
        result = evaluator::evaluate(expr, env)?;
    }
    Ok(result)
}
