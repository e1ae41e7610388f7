//! Lexically scoped environments: a name-to-value map with an optional
//! parent link, plus lookup through the built-in registry as a fallback.

use std::{cell::RefCell, collections::HashMap, collections::HashSet, rc::Rc};

use crate::{
    error::Error,
    logger::log_warning,
    node::{Slot, Value, make},
    registry,
};

pub struct Env {
    vars: HashMap<String, Slot>,
    parent: Option<Rc<RefCell<Env>>>,
}

impl Env {
    pub fn new(parent: Option<Rc<RefCell<Env>>>) -> Self {
        Env {
            vars: HashMap::new(),
            parent,
        }
    }

    pub fn child(parent: &Rc<RefCell<Env>>) -> Rc<RefCell<Env>> {
        Rc::new(RefCell::new(Env::new(Some(parent.clone()))))
    }

    /// Insert or overwrite `name` in the current environment only.
    pub fn define(&mut self, name: &str, value: Slot) {
        self.vars.insert(name.to_string(), value);
    }

    /// Walk the parent chain, overwriting the first binding found.
    pub fn assign(env: &Rc<RefCell<Env>>, name: &str, value: Slot) -> Result<(), Error> {
        let mut cur = env.clone();
        loop {
            if cur.borrow().vars.contains_key(name) {
                cur.borrow_mut().vars.insert(name.to_string(), value);
                return Ok(());
            }
            let parent = cur.borrow().parent.clone();
            match parent {
                Some(p) => cur = p,
                None => return Err(Error::name(format!("{name} is not defined"))),
            }
        }
    }

    /// Walk the parent chain, falling back to the built-in registry. A
    /// resolved symbol value is dereferenced again (fixed-point, with a
    /// cycle guard) before being returned.
    pub fn lookup(env: &Rc<RefCell<Env>>, name: &str) -> Result<Slot, Error> {
        let mut current = name.to_string();
        let mut seen = HashSet::new();
        seen.insert(current.clone());
        loop {
            let value = Self::raw_lookup(env, &current)?;
            let next_name = match &value {
                Some(rc) => match &*rc.borrow() {
                    Value::Symbol(s) => Some(s.clone()),
                    _ => None,
                },
                None => None,
            };
            match next_name {
                Some(next) if seen.insert(next.clone()) => {
                    current = next;
                }
                Some(repeated) => {
                    log_warning(format!(
                        "lookup: breaking self-referential symbol alias cycle at '{repeated}'"
                    ));
                    return Ok(value);
                }
                None => return Ok(value),
            }
        }
    }

    fn raw_lookup(env: &Rc<RefCell<Env>>, name: &str) -> Result<Slot, Error> {
        let mut cur = env.clone();
        loop {
            if let Some(v) = cur.borrow().vars.get(name) {
                return Ok(v.clone());
            }
            let parent = cur.borrow().parent.clone();
            match parent {
                Some(p) => cur = p,
                None => break,
            }
        }
        match registry::lookup(name) {
            Some(builtin) => Ok(Some(make(Value::BuiltIn(builtin)))),
            None => Err(Error::name(format!("{name} is not defined"))),
        }
    }

    /// Names bound directly in this environment (not its parents).
    pub fn names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    /// Same search as `lookup`, without raising on a miss.
    pub fn has(env: &Rc<RefCell<Env>>, name: &str) -> bool {
        let mut cur = env.clone();
        loop {
            if cur.borrow().vars.contains_key(name) {
                return true;
            }
            let parent = cur.borrow().parent.clone();
            match parent {
                Some(p) => cur = p,
                None => break,
            }
        }
        registry::lookup(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_is_local() {
        let root = Rc::new(RefCell::new(Env::new(None)));
        root.borrow_mut()
            .define("x", Some(make(Value::Integer(1))));
        let child = Env::child(&root);
        child
            .borrow_mut()
            .define("x", Some(make(Value::Integer(2))));
        assert!(matches!(
            &*Env::lookup(&child, "x").unwrap().unwrap().borrow(),
            Value::Integer(2)
        ));
        assert!(matches!(
            &*Env::lookup(&root, "x").unwrap().unwrap().borrow(),
            Value::Integer(1)
        ));
    }

    #[test]
    fn assign_walks_parent_chain() {
        let root = Rc::new(RefCell::new(Env::new(None)));
        root.borrow_mut()
            .define("x", Some(make(Value::Integer(1))));
        let child = Env::child(&root);
        Env::assign(&child, "x", Some(make(Value::Integer(9)))).unwrap();
        assert!(matches!(
            &*Env::lookup(&root, "x").unwrap().unwrap().borrow(),
            Value::Integer(9)
        ));
    }

    #[test]
    fn assign_unbound_is_name_error() {
        let root = Rc::new(RefCell::new(Env::new(None)));
        let err = Env::assign(&root, "nope", Some(make(Value::Integer(1)))).unwrap_err();
        assert!(matches!(err, Error::Name(_)));
    }

    #[test]
    fn lookup_missing_is_name_error() {
        let root = Rc::new(RefCell::new(Env::new(None)));
        let err = Env::lookup(&root, "nope").unwrap_err();
        assert!(matches!(err, Error::Name(_)));
    }

    #[test]
    fn lookup_falls_back_to_registry() {
        let root = Rc::new(RefCell::new(Env::new(None)));
        let value = Env::lookup(&root, "+").unwrap();
        assert!(matches!(&*value.unwrap().borrow(), Value::BuiltIn(_)));
    }

    #[test]
    fn lookup_dereferences_symbol_aliases() {
        let root = Rc::new(RefCell::new(Env::new(None)));
        root.borrow_mut()
            .define("y", Some(make(Value::Integer(42))));
        root.borrow_mut()
            .define("x", Some(make(Value::Symbol("y".to_string()))));
        let resolved = Env::lookup(&root, "x").unwrap();
        assert!(matches!(&*resolved.unwrap().borrow(), Value::Integer(42)));
    }

    #[test]
    fn lookup_breaks_self_referential_alias_cycle() {
        let root = Rc::new(RefCell::new(Env::new(None)));
        root.borrow_mut()
            .define("x", Some(make(Value::Symbol("y".to_string()))));
        root.borrow_mut()
            .define("y", Some(make(Value::Symbol("x".to_string()))));
        // Must terminate rather than loop forever.
        let _ = Env::lookup(&root, "x").unwrap();
    }

    #[test]
    fn has_does_not_raise() {
        let root = Rc::new(RefCell::new(Env::new(None)));
        assert!(!Env::has(&root, "nope"));
        assert!(Env::has(&root, "+"));
    }
}
