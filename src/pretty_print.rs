use crate::{EvalError, LexerError, LispError, ParseError};
use ariadne::{Label, Report, ReportKind, Source};
use std::ops::Range;

const SOURCE_ID: &str = "REPL";

type LispReport = Report<'static, (&'static str, Range<usize>)>;

impl LispError {
    /// Prints a report for this error to stderr, pointing into `input`.
    pub fn pretty_print(&self, input: &str) -> std::io::Result<()> {
        let report = match self {
            LispError::Tokenize(lex_err) => lexer_report(lex_err),
            LispError::Parse(parse_err) => parse_report(parse_err, input),
            LispError::Eval(eval_err) => eval_report(eval_err, input),
        };
        report.eprint((SOURCE_ID, Source::from(input)))
    }
}

fn lexer_report(lex_err: &LexerError) -> LispReport {
    let range = lex_err.span.to_range();
    Report::build(ReportKind::Error, (SOURCE_ID, range.clone()))
        .with_message("Tokenize Error")
        .with_label(Label::new((SOURCE_ID, range)).with_message(lex_err.error.to_string()))
        .finish()
}

fn parse_report(parse_err: &ParseError, input: &str) -> LispReport {
    let end = input.len()..input.len();
    let report = match parse_err {
        ParseError::UnexpectedToken { found, expected } => {
            let range = found.span.to_range();
            Report::build(ReportKind::Error, (SOURCE_ID, range.clone()))
                .with_message(format!("Unexpected {}: {}", found.kind.name(), found.kind))
                .with_label(
                    Label::new((SOURCE_ID, range)).with_message(format!("Expected {expected}")),
                )
        }
        ParseError::UnexpectedEof(expected) => {
            Report::build(ReportKind::Error, (SOURCE_ID, end.clone()))
                .with_message("Unexpected end of input")
                .with_label(Label::new((SOURCE_ID, end)).with_message(format!("Expected {expected}")))
        }
        ParseError::InvalidDotSyntax(span) => {
            Report::build(ReportKind::Error, (SOURCE_ID, span.to_range()))
                .with_message("Malformed dotted list")
                .with_label(
                    Label::new((SOURCE_ID, span.to_range()))
                        .with_message("A dot must be followed by exactly one expression and ')'"),
                )
        }
        ParseError::EmptyQuote(span) => {
            Report::build(ReportKind::Error, (SOURCE_ID, span.to_range()))
                .with_message("Quoted empty expression")
                .with_label(
                    Label::new((SOURCE_ID, span.to_range()))
                        .with_message("Nothing follows this quote"),
                )
        }
        ParseError::EmptyInput => {
            Report::build(ReportKind::Error, (SOURCE_ID, end)).with_message("No expression to evaluate")
        }
        ParseError::LexerError(lex_err) => return lexer_report(lex_err),
    };
    report.finish()
}

// Values carry no source positions, so evaluation errors label the whole input.
fn eval_report(eval_err: &EvalError, input: &str) -> LispReport {
    let whole = 0..input.len();
    let note = match eval_err {
        EvalError::EnvError(_) => "This symbol is not defined in the current scope",
        EvalError::NotAProcedure(_) => "This expression cannot be called as a function",
        EvalError::WrongArity { .. } => "Argument count does not match",
        EvalError::TypeMismatch { .. } => "Argument has the wrong type",
        EvalError::NotASymbol(_) => "Only symbols can be bound",
        EvalError::InvalidSpecialForm(_) => "This special form is malformed or incomplete",
        EvalError::InvalidArguments(_) => "Invalid arguments",
    };
    Report::build(ReportKind::Error, (SOURCE_ID, whole.clone()))
        .with_message(eval_err.to_string())
        .with_label(Label::new((SOURCE_ID, whole)).with_message(note))
        .finish()
}
