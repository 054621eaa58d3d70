use crate::environment::Env;
use crate::evaluator::{EvalError, EvalResult};
use crate::types::Expr;

// Arity is checked by the evaluator before these run, so each one can
// destructure its arguments directly.

fn type_mismatch(name: &str, expected: &'static str, found: &Expr) -> EvalResult {
    Err(EvalError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.clone(),
    })
}

fn arity_mismatch(name: &str, expected: usize, args: &[Expr]) -> EvalResult {
    Err(EvalError::WrongArity {
        name: format!("function {}", name),
        expected,
        found: args.len(),
    })
}

pub fn prim_sub(args: &[Expr], _env: &Env) -> EvalResult {
    match args {
        [Expr::Integer(a), Expr::Integer(b)] => {
            a.checked_sub(*b).map(Expr::Integer).ok_or_else(|| {
                EvalError::InvalidArguments(format!("integer overflow in (- {} {})", a, b))
            })
        }
        [Expr::Integer(_), other] | [other, _] => type_mismatch("-", "integer arguments", other),
        _ => arity_mismatch("-", 2, args),
    }
}

pub fn prim_cons(args: &[Expr], _env: &Env) -> EvalResult {
    match args {
        [car, cdr] => Ok(Expr::cons(car.clone(), cdr.clone())),
        _ => arity_mismatch("cons", 2, args),
    }
}

pub fn prim_car(args: &[Expr], _env: &Env) -> EvalResult {
    match args {
        [Expr::Cons(pair)] => Ok(pair.car.clone()),
        [other] => type_mismatch("car", "a cons cell", other),
        _ => arity_mismatch("car", 1, args),
    }
}

pub fn prim_cdr(args: &[Expr], _env: &Env) -> EvalResult {
    match args {
        [Expr::Cons(pair)] => Ok(pair.cdr.clone()),
        [other] => type_mismatch("cdr", "a cons cell", other),
        _ => arity_mismatch("cdr", 1, args),
    }
}

pub fn prim_list(args: &[Expr], _env: &Env) -> EvalResult {
    // (list) -> nil
    // (list 1 2 3) -> (1 2 3)
    Ok(Expr::list(args.iter().cloned()))
}
