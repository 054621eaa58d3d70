use crate::environment::Env;
use crate::evaluator::EvalResult;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// An interned symbol name. Equality and hashing go by the name text so
/// symbols can key environment bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single runtime type. Parsed code and evaluated data share it.
#[derive(Debug, Clone)]
pub enum Expr {
    Integer(i64),
    String(String),
    Symbol(Symbol),
    True,
    Nil, // Also the empty list
    Cons(Rc<Pair>),
    Quoted(Rc<Expr>),
    Dot, // Only meaningful between the last two elements of a list
    Closure(Rc<Closure>),
    Native(Rc<NativeFunction>),
    Sequence(Rc<[Expr]>), // Closure bodies
}

#[derive(Debug, PartialEq)]
pub struct Pair {
    pub car: Expr,
    pub cdr: Expr,
}

pub struct Closure {
    pub env: Env,
    pub params: Vec<Symbol>,
    pub body: Expr,
}

impl fmt::Debug for Closure {
    // The captured environment may hold this closure, so it is left out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic,
}

/// Receives the already-evaluated arguments and the calling scope.
pub type NativeFn = fn(&[Expr], &Env) -> EvalResult;

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Native({}, {:?})", self.name, self.arity)
    }
}

impl Expr {
    pub fn symbol(name: &str) -> Self {
        Expr::Symbol(Symbol::new(name))
    }

    pub fn string(s: &str) -> Self {
        Expr::String(s.to_string())
    }

    pub fn cons(car: Expr, cdr: Expr) -> Self {
        Expr::Cons(Rc::new(Pair { car, cdr }))
    }

    pub fn quoted(inner: Expr) -> Self {
        Expr::Quoted(Rc::new(inner))
    }

    pub fn native(name: &'static str, arity: Arity, func: NativeFn) -> Self {
        Expr::Native(Rc::new(NativeFunction { name, arity, func }))
    }

    /// Builds a proper list, or a dotted one when `tail` is not `Nil`.
    pub fn list_with_tail(
        items: impl IntoIterator<Item = Expr, IntoIter: DoubleEndedIterator>,
        tail: Expr,
    ) -> Self {
        items
            .into_iter()
            .rev()
            .fold(tail, |cdr, car| Expr::cons(car, cdr))
    }

    pub fn list(items: impl IntoIterator<Item = Expr, IntoIter: DoubleEndedIterator>) -> Self {
        Expr::list_with_tail(items, Expr::Nil)
    }

    /// Collects the elements of a proper list. Returns `None` for dotted
    /// lists and for anything that is not a list at all.
    pub fn list_items(&self) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        let mut current = self;
        loop {
            match current {
                Expr::Nil => return Some(items),
                Expr::Cons(pair) => {
                    items.push(pair.car.clone());
                    current = &pair.cdr;
                }
                _ => return None,
            }
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Expr::Closure(_) | Expr::Native(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Integer(_) => "integer",
            Expr::String(_) => "string",
            Expr::Symbol(_) => "symbol",
            Expr::True => "t",
            Expr::Nil => "nil",
            Expr::Cons(_) => "cons cell",
            Expr::Quoted(_) => "quoted expression",
            Expr::Dot => "dot",
            Expr::Closure(_) => "lambda function",
            Expr::Native(_) => "native function",
            Expr::Sequence(_) => "expression sequence",
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Integer(a), Expr::Integer(b)) => a == b,
            (Expr::String(a), Expr::String(b)) => a == b,
            (Expr::Symbol(a), Expr::Symbol(b)) => a == b,
            (Expr::True, Expr::True) | (Expr::Nil, Expr::Nil) | (Expr::Dot, Expr::Dot) => true,
            (Expr::Cons(a), Expr::Cons(b)) => a == b,
            (Expr::Quoted(a), Expr::Quoted(b)) => a == b,
            (Expr::Closure(a), Expr::Closure(b)) => Rc::ptr_eq(a, b),
            (Expr::Native(a), Expr::Native(b)) => a.name == b.name,
            (Expr::Sequence(a), Expr::Sequence(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Expr::Integer(n) => n.hash(state),
            Expr::String(s) => s.hash(state),
            Expr::Symbol(symbol) => symbol.hash(state),
            Expr::Cons(pair) => {
                pair.car.hash(state);
                pair.cdr.hash(state);
            }
            Expr::Quoted(inner) => inner.hash(state),
            Expr::Closure(closure) => std::ptr::hash(Rc::as_ptr(closure), state),
            Expr::Native(native) => native.name.hash(state),
            Expr::Sequence(exprs) => exprs.hash(state),
            Expr::True | Expr::Nil | Expr::Dot => {}
        }
    }
}

// A backslash the lexer kept from an unknown escape (`\a`) is written back
// bare so the string prints the way it was typed.
fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' if chars.peek().is_some_and(|next| !is_escape_letter(*next)) => {
                f.write_str("\\")?
            }
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

// True when `c` printed right after a bare backslash would read back as an escape.
fn is_escape_letter(c: char) -> bool {
    matches!(c, 'n' | 'r' | 't' | '\\' | '"' | '\n' | '\r' | '\t')
}

// Canonical print form. Parsing this output gives back an equal expression
// for every literal, symbol, list and quoted value.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(n) => write!(f, "{}", n),
            Expr::String(s) => write_escaped(f, s),
            Expr::Symbol(symbol) => write!(f, "{}", symbol),
            Expr::True => write!(f, "t"),
            Expr::Nil => write!(f, "nil"),
            Expr::Cons(pair) => {
                write!(f, "({}", pair.car)?;
                let mut rest = &pair.cdr;
                loop {
                    match rest {
                        Expr::Nil => break,
                        Expr::Cons(next) => {
                            write!(f, " {}", next.car)?;
                            rest = &next.cdr;
                        }
                        tail => {
                            write!(f, " . {}", tail)?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Expr::Quoted(inner) => write!(f, "'{}", inner),
            Expr::Dot => write!(f, "."),
            Expr::Closure(_) => write!(f, "<lambda function>"),
            Expr::Native(native) => write!(f, "<native function {}>", native.name),
            Expr::Sequence(exprs) => {
                let mut first = true;
                for expr in exprs.iter() {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", expr)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}
