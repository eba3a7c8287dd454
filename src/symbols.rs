use crate::function::Function;
use crate::value::Complex;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// A session binding: a number or a (possibly native) function. Functions
/// are reference counted so a call can hold one while its body re-enters the
/// symbol table.
#[derive(Debug, Clone)]
pub enum Value {
    Number(Complex),
    Function(Rc<Function>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Function(function) => write!(f, "{function}"),
        }
    }
}

/// Global bindings plus a stack of call-local scopes. A lookup consults the
/// innermost local scope and then the globals; enclosing call scopes are
/// invisible, so functions only close over globals.
pub struct SymbolTable {
    globals: HashMap<String, Value>,
    locals: Vec<HashMap<String, Value>>,
    protected: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            globals: HashMap::new(),
            locals: Vec::new(),
            protected: HashSet::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(frame) = self.locals.last() {
            if let Some(value) = frame.get(name) {
                return Some(value);
            }
        }

        self.globals.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Binds into the current scope, locals when inside a call.
    pub fn insert(&mut self, name: String, value: Value) {
        match self.locals.last_mut() {
            Some(frame) => frame.insert(name, value),
            None => self.globals.insert(name, value),
        };
    }

    /// Removes a binding from the current scope.
    pub fn remove(&mut self, name: &str) {
        match self.locals.last_mut() {
            Some(frame) => frame.remove(name),
            None => self.globals.remove(name),
        };
    }

    /// Binds a global, refusing to touch a protected name.
    pub fn set_global(&mut self, name: &str, value: Value) -> Result<(), String> {
        if self.protected.contains(name) {
            return Err(format!("'{name}' is protected and can't be redefined"));
        }

        self.globals.insert(name.to_string(), value);
        Ok(())
    }

    /// Deletes a global, refusing protected names. Returns whether the name
    /// was bound.
    pub fn remove_global(&mut self, name: &str) -> Result<bool, String> {
        if self.protected.contains(name) {
            return Err(format!("'{name}' is protected and can't be deleted"));
        }

        Ok(self.globals.remove(name).is_some())
    }

    /// Marks every currently bound global as protected. Called once after
    /// the built-ins are loaded.
    pub fn protect_existing(&mut self) {
        self.protected.extend(self.globals.keys().cloned());
    }

    pub fn push_scope(&mut self) {
        self.locals.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.locals.pop();
    }

    /// The global names currently bound to numbers. The parser uses these to
    /// tell a variable adjacency from a function call.
    pub fn variable_names(&self) -> HashSet<String> {
        self.globals
            .iter()
            .filter(|(_, value)| matches!(value, Value::Number(_)))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
