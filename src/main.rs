use botlisp::Environment;
use std::process::ExitCode;

// Evaluates the first argument in a fresh global environment and prints
// the result, e.g. `botlisp "(list 1 2 3)"`.
fn main() -> ExitCode {
    env_logger::init();

    let Some(input) = std::env::args().nth(1) else {
        eprintln!("usage: botlisp <expression>");
        return ExitCode::FAILURE;
    };

    let globals = Environment::new_global_populated();
    match botlisp::evaluate(&globals, &input) {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}
