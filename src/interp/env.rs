//! Variable storage: a global table, block scopes at script level, and a
//! stack of call frames. Lookup walks the current frame's scopes innermost
//! first, then the globals; callers' locals are never visible.

use std::collections::HashMap;

use super::Value;

pub struct Environment {
    globals: HashMap<String, Value>,
    script: Vec<HashMap<String, Value>>,
    calls: Vec<Vec<HashMap<String, Value>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            globals: HashMap::new(),
            script: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn push_scope(&mut self) {
        self.stack_mut().push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.stack_mut().pop();
    }

    /// Enter a function call. The frame starts with one scope for parameters.
    pub fn push_frame(&mut self) {
        self.calls.push(vec![HashMap::new()]);
    }

    pub fn pop_frame(&mut self) {
        self.calls.pop();
    }

    /// Bind a name in the innermost scope, or in the globals when no scope is
    /// open.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let stack = self.stack_mut();
        if let Some(scope) = stack.last_mut() {
            scope.insert(name.into(), value);
            return;
        }
        self.globals.insert(name.into(), value);
    }

    /// Rebind an existing name. Returns false when the name is not in scope.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        let stack = self.stack_mut();
        if let Some(idx) = stack.iter().rposition(|scope| scope.contains_key(name)) {
            stack[idx].insert(name.to_string(), value);
            return true;
        }
        if self.globals.contains_key(name) {
            self.globals.insert(name.to_string(), value);
            return true;
        }
        false
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        for scope in self.stack().iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(value);
            }
        }
        self.globals.get(name)
    }

    fn stack(&self) -> &[HashMap<String, Value>] {
        match self.calls.last() {
            Some(frame) => frame,
            None => &self.script,
        }
    }

    fn stack_mut(&mut self) -> &mut Vec<HashMap<String, Value>> {
        if self.calls.is_empty() {
            &mut self.script
        } else {
            let last = self.calls.len() - 1;
            &mut self.calls[last]
        }
    }
}
