//! The value model: tagged values, pair cells, and the printer.

use std::{
    cell::RefCell,
    collections::HashSet,
    fmt::{self, Display},
    rc::Rc,
};

use crate::{env::Env, registry::BuiltIn};

/// Every car/cdr/argument/result position is nullable; a `None` slot is nil.
pub type Slot = Option<Rc<RefCell<Value>>>;

/// A tagged value. `Pair` is mutable through `Env`/evaluator setters; every
/// other variant is immutable once constructed.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Symbol(String),
    Pair(Slot, Slot),
    BuiltIn(BuiltIn),
    Closure(Closure),
    LambdaTemplate(LambdaTemplate),
}

/// A user-defined procedure: a captured environment, its formal parameters,
/// and a non-empty body evaluated left-to-right.
#[derive(Clone)]
pub struct Closure {
    pub env: Rc<RefCell<Env>>,
    pub params: Vec<String>,
    pub body: Vec<Slot>,
}

/// An un-instantiated closure. Evaluating one yields a `Closure` rooted at
/// `env`; this delays environment capture for `(define (f ...) ...)`, which
/// only needs to see bindings made *after* it runs once it is actually
/// referenced, not at definition time.
#[derive(Clone)]
pub struct LambdaTemplate {
    pub env: Rc<RefCell<Env>>,
    pub params: Vec<String>,
    pub body: Vec<Slot>,
}

/// Wrap a `Value` in the shared, mutable cell every slot is built from.
pub fn make(value: Value) -> Rc<RefCell<Value>> {
    Rc::new(RefCell::new(value))
}

pub fn is_truthy(value: &Slot) -> bool {
    match value {
        Some(rc) => !matches!(&*rc.borrow(), Value::Boolean(false)),
        None => true,
    }
}

pub fn is_symbol_named(value: &Slot, name: &str) -> bool {
    matches!(value, Some(rc) if matches!(&*rc.borrow(), Value::Symbol(s) if s == name))
}

/// `serialize` renders nil as `()`, which is why it takes a `Slot` rather
/// than a bare `Value`: nil is not itself a `Value` variant.
pub fn serialize(value: &Slot) -> String {
    let mut visited = HashSet::new();
    let mut out = String::new();
    write_slot(&mut out, value, &mut visited);
    out
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visited = HashSet::new();
        let mut out = String::new();
        write_value(&mut out, self, &mut visited);
        write!(f, "{out}")
    }
}

fn write_slot(out: &mut String, slot: &Slot, visited: &mut HashSet<usize>) {
    match slot {
        None => out.push_str("()"),
        Some(rc) => {
            let ptr = Rc::as_ptr(rc) as usize;
            if !visited.insert(ptr) {
                out.push_str("...");
                return;
            }
            write_value(out, &rc.borrow(), visited);
        }
    }
}

fn write_value(out: &mut String, value: &Value, visited: &mut HashSet<usize>) {
    match value {
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Boolean(true) => out.push_str("#t"),
        Value::Boolean(false) => out.push_str("#f"),
        Value::Symbol(name) => out.push_str(name),
        Value::BuiltIn(_) | Value::Closure(_) | Value::LambdaTemplate(_) => {}
        Value::Pair(car, cdr) => {
            if car.is_none() && cdr.is_none() {
                out.push_str("(())");
                return;
            }
            out.push('(');
            write_slot(out, car, visited);
            let mut rest = cdr.clone();
            loop {
                match rest {
                    None => break,
                    Some(rc) => {
                        let ptr = Rc::as_ptr(&rc) as usize;
                        let is_pair = matches!(&*rc.borrow(), Value::Pair(_, _));
                        if is_pair {
                            if !visited.insert(ptr) {
                                out.push_str(" ...");
                                break;
                            }
                            let (next_car, next_cdr) = match &*rc.borrow() {
                                Value::Pair(car, cdr) => (car.clone(), cdr.clone()),
                                _ => unreachable!(),
                            };
                            out.push(' ');
                            write_slot(out, &next_car, visited);
                            rest = next_cdr;
                        } else {
                            out.push_str(" . ");
                            write_value(out, &rc.borrow(), visited);
                            break;
                        }
                    }
                }
            }
            out.push(')');
        }
    }
}
