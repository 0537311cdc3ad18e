//! Lexical scoping for the [evaluator](crate::eval).
//!
//! An [Environment] is a flat map of bindings plus an optional link to the enclosing scope it
//! was created in. Lookups walk outward until a binding is found or the chain runs out; writes
//! always land in the current frame, which is how shadowing works (`let len = 5;` never touches
//! an outer `len`, builtin or otherwise).
//!
//! Function values capture their defining environment behind an `Rc<RefCell<_>>` handle so
//! closures keep working after the scope that created them returns. This does mean a closure
//! that stores itself in its own captured environment leaks - tolerated here since interpreter
//! sessions are short-lived and there is no garbage collector to run anyway.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// A fresh, top-level environment with no enclosing scope.
    pub fn new() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// A new scope nested inside `outer`, e.g. for a function call's parameter bindings.
    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }))
    }

    /// Look up `name`, checking this frame first and then walking outward through enclosing
    /// scopes. Returns `None` if no frame in the chain has it bound.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Bind `name` to `value` in this frame only, shadowing (without altering) any binding of
    /// the same name in an enclosing scope.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Value {
        self.store.insert(name.into(), value.clone());
        value
    }
}
