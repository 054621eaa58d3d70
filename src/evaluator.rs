use crate::environment::{Env, EnvError, Environment};
use crate::types::{Arity, Closure, Expr, Pair, Symbol};
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

const LAMBDA: &str = "lambda";
const SETQ: &str = "setq";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    EnvError(#[from] EnvError),
    #[error("attempt to call non-function: {0}")]
    NotAProcedure(Expr),
    #[error("wrong number of arguments to {name}: expected {expected}, got {found}")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("{name} expects {expected}, got {}", describe_value(.found))]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: Expr,
    },
    #[error("expected a symbol, got {0}")]
    NotASymbol(Expr),
    #[error("invalid special form: {0}")]
    InvalidSpecialForm(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

pub type EvalResult<T = Expr> = Result<T, EvalError>;

// Singletons print as their own type name, so they are shown once.
fn describe_value(value: &Expr) -> String {
    match value {
        Expr::True | Expr::Nil | Expr::Dot => value.to_string(),
        other => format!("{} {}", other.type_name(), other),
    }
}

/// Names the evaluator handles itself instead of looking them up.
pub fn special_form_identifiers() -> HashSet<String> {
    [LAMBDA, SETQ].iter().map(|s| s.to_string()).collect()
}

/// Reduces `expr` to a value in `env`.
pub fn evaluate(expr: &Expr, env: &Env) -> EvalResult {
    match expr {
        Expr::Integer(_)
        | Expr::String(_)
        | Expr::True
        | Expr::Nil
        | Expr::Dot
        | Expr::Closure(_)
        | Expr::Native(_) => Ok(expr.clone()),
        Expr::Symbol(name) => Ok(env.borrow().get(name)?),
        // Exactly one layer comes off; the inner expression is not reduced.
        Expr::Quoted(inner) => Ok(Expr::clone(inner)),
        Expr::Sequence(exprs) => evaluate_sequence(exprs, env),
        Expr::Cons(pair) => evaluate_cons(pair, env),
    }
}

fn evaluate_sequence(exprs: &[Expr], env: &Env) -> EvalResult {
    let mut result = Expr::Nil;
    for expr in exprs {
        result = evaluate(expr, env)?;
    }
    Ok(result)
}

fn evaluate_cons(pair: &Pair, env: &Env) -> EvalResult {
    match &pair.car {
        Expr::Symbol(name) if name.name() == LAMBDA => evaluate_lambda(&pair.cdr, env),
        Expr::Symbol(name) if name.name() == SETQ => evaluate_setq(&pair.cdr, env),
        // A computed operator is applied in the current scope directly.
        Expr::Cons(_) => {
            let callable = evaluate(&pair.car, env)?;
            apply(&callable, &pair.cdr, env)
        }
        operator => {
            let callable = evaluate(operator, env)?;
            if !callable.is_callable() {
                return Err(EvalError::NotAProcedure(callable));
            }
            let call_env = Environment::new_enclosed(env.clone());
            apply(&callable, &pair.cdr, &call_env)
        }
    }
}

fn evaluate_lambda(form: &Expr, env: &Env) -> EvalResult {
    let Expr::Cons(form) = form else {
        return Err(EvalError::InvalidSpecialForm(
            "lambda expects a parameter list".to_string(),
        ));
    };

    let params = form
        .car
        .list_items()
        .ok_or_else(|| {
            EvalError::InvalidSpecialForm(format!(
                "lambda parameters must be a list, got {}",
                form.car
            ))
        })?
        .into_iter()
        .map(|param| match param {
            Expr::Symbol(symbol) => Ok(symbol),
            other => Err(EvalError::NotASymbol(other)),
        })
        .collect::<EvalResult<Vec<Symbol>>>()?;

    let body = form.cdr.list_items().ok_or_else(|| {
        EvalError::InvalidSpecialForm("lambda body must be a proper list".to_string())
    })?;

    log::debug!(
        "creating closure with {} parameter(s) and {} body expression(s)",
        params.len(),
        body.len()
    );
    Ok(Expr::Closure(Rc::new(Closure {
        env: env.clone(),
        params,
        body: Expr::Sequence(body.into()),
    })))
}

fn evaluate_setq(operands: &Expr, env: &Env) -> EvalResult {
    match operands.list_items().as_deref() {
        Some([Expr::Symbol(name), value_expr]) => {
            let value = evaluate(value_expr, env)?;
            env.borrow_mut().define(name.clone(), value.clone());
            Ok(value)
        }
        Some([other, _]) => Err(EvalError::NotASymbol(other.clone())),
        _ => Err(EvalError::InvalidSpecialForm(
            "setq expects a symbol and a value".to_string(),
        )),
    }
}

/// Applies `callable` to the unevaluated argument list `args`. Arguments are
/// evaluated in `env`, the calling scope.
pub fn apply(callable: &Expr, args: &Expr, env: &Env) -> EvalResult {
    let args = args.list_items().ok_or_else(|| {
        EvalError::InvalidArguments(format!("improper argument list: {}", args))
    })?;

    match callable {
        Expr::Native(native) => {
            if let Arity::Fixed(expected) = native.arity
                && args.len() != expected
            {
                return Err(EvalError::WrongArity {
                    name: format!("function {}", native.name),
                    expected,
                    found: args.len(),
                });
            }
            let values = args
                .iter()
                .map(|arg| evaluate(arg, env))
                .collect::<EvalResult<Vec<Expr>>>()?;
            log::trace!("applying native {} to {} argument(s)", native.name, values.len());
            (native.func)(&values, env)
        }
        Expr::Closure(closure) => {
            if args.len() != closure.params.len() {
                return Err(EvalError::WrongArity {
                    name: "lambda function".to_string(),
                    expected: closure.params.len(),
                    found: args.len(),
                });
            }
            let values = args
                .iter()
                .map(|arg| evaluate(arg, env))
                .collect::<EvalResult<Vec<Expr>>>()?;

            // Each call gets its own frame on top of the captured scope.
            let frame = Environment::new_enclosed(closure.env.clone());
            {
                let mut frame = frame.borrow_mut();
                for (param, value) in closure.params.iter().zip(values) {
                    frame.define(param.clone(), value);
                }
            }
            log::trace!("applying closure to {} argument(s)", args.len());
            evaluate(&closure.body, &frame)
        }
        other => Err(EvalError::NotAProcedure(other.clone())),
    }
}
