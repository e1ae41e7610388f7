//! The evaluator: `eval`/`apply` over the value tree, plus operand
//! flattening and closure application.

use std::{cell::RefCell, rc::Rc};

use crate::{
    env::Env,
    error::Error,
    logger::log_debug,
    node::{Closure, Slot, Value, is_symbol_named, make, serialize},
    registry::BuiltIn,
};

pub fn eval(value: Slot, env: &Rc<RefCell<Env>>) -> Result<Slot, Error> {
    log_debug(format!("eval enter: {}", serialize(&value)));
    let result = eval_inner(value, env);
    match &result {
        Ok(v) => log_debug(format!("eval exit: {}", serialize(v))),
        Err(e) => log_debug(format!("eval exit with error: {e}")),
    }
    result
}

fn eval_inner(value: Slot, env: &Rc<RefCell<Env>>) -> Result<Slot, Error> {
    let rc = match value {
        None => return Err(Error::runtime("cannot evaluate an empty application")),
        Some(rc) => rc,
    };

    let pair = match &*rc.borrow() {
        Value::Pair(car, cdr) => Some((car.clone(), cdr.clone())),
        _ => None,
    };

    let Some((car, cdr)) = pair else {
        return eval_atom(&rc, env);
    };

    if is_symbol_named(&car, "quote") {
        return Ok(quote_operand(&cdr));
    }

    let head = eval(car, env)?;
    let operands = flatten(cdr);
    apply(head, operands, env)
}

fn eval_atom(rc: &Rc<RefCell<Value>>, env: &Rc<RefCell<Env>>) -> Result<Slot, Error> {
    enum Dispatch {
        SelfEval,
        Template(Closure),
        Sym(String),
    }

    let dispatch = match &*rc.borrow() {
        Value::Integer(_) | Value::Boolean(_) | Value::Closure(_) | Value::BuiltIn(_) => {
            Dispatch::SelfEval
        }
        Value::LambdaTemplate(t) => Dispatch::Template(Closure {
            env: t.env.clone(),
            params: t.params.clone(),
            body: t.body.clone(),
        }),
        Value::Symbol(s) => Dispatch::Sym(s.clone()),
        Value::Pair(_, _) => unreachable!("eval_atom called on a pair"),
    };

    match dispatch {
        Dispatch::SelfEval => Ok(Some(rc.clone())),
        Dispatch::Template(closure) => Ok(Some(make(Value::Closure(closure)))),
        Dispatch::Sym(name) => {
            let resolved = Env::lookup(env, &name)?;
            if let Some(r) = &resolved {
                if matches!(&*r.borrow(), Value::LambdaTemplate(_)) {
                    return eval(Some(r.clone()), env);
                }
            }
            Ok(resolved)
        }
    }
}

fn quote_operand(tail: &Slot) -> Slot {
    match tail {
        Some(rc) => match &*rc.borrow() {
            Value::Pair(car, _) => car.clone(),
            _ => Some(rc.clone()),
        },
        None => None,
    }
}

/// Walk the cdr chain, appending each car to the operand sequence; if the
/// chain ends in a non-nil, non-pair value, that value is appended as the
/// final element.
pub fn flatten(tail: Slot) -> Vec<Slot> {
    let mut out = Vec::new();
    let mut cur = tail;
    loop {
        match cur {
            None => break,
            Some(rc) => {
                let pair = match &*rc.borrow() {
                    Value::Pair(car, cdr) => Some((car.clone(), cdr.clone())),
                    _ => None,
                };
                match pair {
                    Some((car, cdr)) => {
                        out.push(car);
                        cur = cdr;
                    }
                    None => {
                        out.push(Some(rc.clone()));
                        break;
                    }
                }
            }
        }
    }
    out
}

fn apply(head: Slot, operands: Vec<Slot>, env: &Rc<RefCell<Env>>) -> Result<Slot, Error> {
    let rc = head.ok_or_else(|| Error::runtime("cannot call nil"))?;

    enum Dispatch {
        BuiltIn(BuiltIn),
        Closure(Closure),
    }

    let dispatch = match &*rc.borrow() {
        Value::BuiltIn(b) => Dispatch::BuiltIn(*b),
        Value::Closure(c) => Dispatch::Closure(c.clone()),
        _ => return Err(Error::runtime("value is not callable")),
    };

    match dispatch {
        Dispatch::BuiltIn(b) => {
            log_debug(format!("dispatch builtin: {}", b.name));
            (b.func)(&operands, env)
        }
        Dispatch::Closure(c) => apply_closure(&c, operands, env),
    }
}

fn apply_closure(
    closure: &Closure,
    operands: Vec<Slot>,
    call_scope: &Rc<RefCell<Env>>,
) -> Result<Slot, Error> {
    // Raw nil operand slots (literal `()` elements in the call) are
    // filtered out before evaluation and never consume a parameter slot.
    let mut evaluated = Vec::with_capacity(operands.len());
    for operand in operands {
        if operand.is_none() {
            continue;
        }
        evaluated.push(eval(operand, call_scope)?);
    }

    if evaluated.len() != closure.params.len() {
        return Err(Error::runtime(format!(
            "closure expected {} argument(s), got {}",
            closure.params.len(),
            evaluated.len()
        )));
    }

    let child = Env::child(&closure.env);
    for (name, value) in closure.params.iter().zip(evaluated) {
        child.borrow_mut().define(name, value);
    }

    let mut result: Slot = None;
    for expr in &closure.body {
        result = eval(expr.clone(), &child)?;
    }
    Ok(result)
}
