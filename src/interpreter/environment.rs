use std::collections::HashMap;

use crate::interpreter::value::Value;

/// Flat variable store for one interpretation run.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    values: HashMap<String, Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`, returning the value it replaced.
    pub fn assign(&mut self, name: &str, value: Value) -> Option<Value> {
        self.values.insert(name.to_string(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_get() {
        let mut table = SymbolTable::new();
        assert_eq!(table.assign("x", Value::Integer(42)), None);
        assert_eq!(table.get("x"), Some(&Value::Integer(42)));
    }

    #[test]
    fn get_undefined_returns_none() {
        let table = SymbolTable::new();
        assert!(table.get("x").is_none());
        assert!(!table.contains("x"));
    }

    #[test]
    fn assign_replaces_existing() {
        let mut table = SymbolTable::new();
        table.assign("x", Value::Integer(1));
        let previous = table.assign("x", Value::Text("dos".into()));
        assert_eq!(previous, Some(Value::Integer(1)));
        assert_eq!(table.get("x"), Some(&Value::Text("dos".into())));
        assert_eq!(table.len(), 1);
    }
}
