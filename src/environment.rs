use crate::primitives;
use crate::types::{Arity, Expr, NativeFn, Symbol};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("couldn't find key '{0}'")]
    Unbound(Symbol),
}

/// Shared handle to a scope. Closures keep the scope they were created in
/// alive through this.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    outer: Option<Env>,
    bindings: HashMap<Symbol, Expr>,
}

impl Environment {
    /// Creates a new, top-level (global) environment.
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// A top-level environment seeded with `t`, `nil` and the native library.
    pub fn new_global_populated() -> Env {
        let env_ptr = Environment::new();
        {
            let mut env = env_ptr.borrow_mut();
            env.define(Symbol::new("t"), Expr::True);
            env.define(Symbol::new("nil"), Expr::Nil);

            env.add_native("-", Arity::Fixed(2), primitives::prim_sub);
            env.add_native("cons", Arity::Fixed(2), primitives::prim_cons);
            env.add_native("car", Arity::Fixed(1), primitives::prim_car);
            env.add_native("cdr", Arity::Fixed(1), primitives::prim_cdr);
            env.add_native("list", Arity::Variadic, primitives::prim_list);
        }
        env_ptr
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer_env: Env) -> Env {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer_env),
            bindings: HashMap::new(),
        }))
    }

    /// Binds `name` in *this* frame only. A binding of the same name in an
    /// outer frame is shadowed, never overwritten.
    pub fn define(&mut self, name: Symbol, value: Expr) {
        log::trace!("bind {} = {}", name, value);
        self.bindings.insert(name, value);
    }

    /// Looks `name` up in this frame, then in each outer frame in turn.
    pub fn get(&self, name: &Symbol) -> Result<Expr, EnvError> {
        if let Some(value) = self.bindings.get(name) {
            Ok(value.clone())
        } else {
            match &self.outer {
                Some(outer_env_ptr) => outer_env_ptr.borrow().get(name),
                None => Err(EnvError::Unbound(name.clone())),
            }
        }
    }

    fn add_native(&mut self, name: &'static str, arity: Arity, func: NativeFn) {
        self.define(Symbol::new(name), Expr::native(name, arity, func));
    }

    fn add_identifiers(&self, mut identifiers: HashSet<String>) -> HashSet<String> {
        for identifier in self.bindings.keys() {
            identifiers.insert(identifier.name().to_string());
        }
        match self.outer {
            Some(ref outer_env_ptr) => outer_env_ptr.borrow().add_identifiers(identifiers),
            None => identifiers,
        }
    }

    /// Every name visible from this frame.
    pub fn identifiers(&self) -> HashSet<String> {
        self.add_identifiers(HashSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Expr {
        Expr::Integer(n)
    }

    fn sym(name: &str) -> Symbol {
        Symbol::new(name)
    }

    #[test]
    fn test_define_and_get_global() {
        let env = Environment::new();
        env.borrow_mut().define(sym("x"), int(10));

        assert_eq!(env.borrow().get(&sym("x")), Ok(int(10)));
    }

    #[test]
    fn test_get_unbound_global() {
        let env = Environment::new();
        let result = env.borrow().get(&sym("y"));
        assert_eq!(result, Err(EnvError::Unbound(sym("y"))));
    }

    #[test]
    fn test_define_and_get_enclosed() {
        let global_env = Environment::new();
        global_env.borrow_mut().define(sym("x"), int(10));

        let local_env = Environment::new_enclosed(global_env);
        local_env.borrow_mut().define(sym("y"), int(20));

        assert_eq!(local_env.borrow().get(&sym("y")), Ok(int(20)));
        assert_eq!(local_env.borrow().get(&sym("x")), Ok(int(10)));
    }

    #[test]
    fn test_get_unbound_enclosed() {
        let global_env = Environment::new();
        let local_env = Environment::new_enclosed(global_env);

        assert_eq!(
            local_env.borrow().get(&sym("z")),
            Err(EnvError::Unbound(sym("z")))
        );
    }

    #[test]
    fn test_shadowing_does_not_touch_outer_frame() {
        let global_env = Environment::new();
        global_env.borrow_mut().define(sym("x"), int(10));

        let local_env = Environment::new_enclosed(global_env.clone());
        local_env.borrow_mut().define(sym("x"), int(50));

        let inner_local_env = Environment::new_enclosed(local_env.clone());
        inner_local_env
            .borrow_mut()
            .define(sym("y"), Expr::string("y-value"));

        assert_eq!(inner_local_env.borrow().get(&sym("x")), Ok(int(50)));
        assert_eq!(
            inner_local_env.borrow().get(&sym("y")),
            Ok(Expr::string("y-value"))
        );
        assert_eq!(local_env.borrow().get(&sym("x")), Ok(int(50)));
        assert_eq!(global_env.borrow().get(&sym("x")), Ok(int(10)));
        assert!(local_env.borrow().get(&sym("y")).is_err());
    }

    #[test]
    fn test_redefine_replaces_local_binding() {
        let env = Environment::new();
        env.borrow_mut().define(sym("x"), int(1));
        env.borrow_mut().define(sym("x"), int(2));
        assert_eq!(env.borrow().get(&sym("x")), Ok(int(2)));
    }

    #[test]
    fn test_global_populated_bindings() {
        let env = Environment::new_global_populated();
        assert_eq!(env.borrow().get(&sym("t")), Ok(Expr::True));
        assert_eq!(env.borrow().get(&sym("nil")), Ok(Expr::Nil));
        for name in ["-", "cons", "car", "cdr", "list"] {
            let value = env.borrow().get(&sym(name));
            assert!(
                matches!(value, Ok(Expr::Native(ref native)) if native.name == name),
                "{} should be a native function, got {:?}",
                name,
                value
            );
        }
    }

    #[test]
    fn test_identifiers_include_outer_frames() {
        let global_env = Environment::new_global_populated();
        let local_env = Environment::new_enclosed(global_env);
        local_env.borrow_mut().define(sym("mine"), int(1));

        let identifiers = local_env.borrow().identifiers();
        assert!(identifiers.contains("mine"));
        assert!(identifiers.contains("cons"));
        assert!(identifiers.contains("nil"));
    }
}
