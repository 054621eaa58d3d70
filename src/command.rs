use crate::environment::{Env, Environment};

/// The `lisp` chat command. Holds one global environment for the whole
/// session, so definitions made in one message are visible in the next.
pub struct LispCommand {
    globals: Env,
}

impl LispCommand {
    pub fn new() -> Self {
        LispCommand {
            globals: Environment::new_global_populated(),
        }
    }

    /// Evaluates the text following the trigger and returns the reply: the
    /// printed value, or the error message when evaluation fails.
    pub fn trigger(&self, argument: &str) -> String {
        match crate::evaluate(&self.globals, argument) {
            Ok(value) => value.to_string(),
            Err(err) => {
                log::debug!("lisp command failed on {:?}: {}", argument, err);
                err.to_string()
            }
        }
    }

    pub fn environment(&self) -> &Env {
        &self.globals
    }
}

impl Default for LispCommand {
    fn default() -> Self {
        Self::new()
    }
}
