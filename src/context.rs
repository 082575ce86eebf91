//! Data context shared by every marker of one render call
//!
//! The context is allocated fresh per top-level render call and threaded
//! mutably through the engine and all nested includes, so a declaration made
//! by one marker is visible to every marker evaluated after it.

use std::collections::{BTreeMap, HashMap};

/// A runtime value inside the expression interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Text substituted into the markup for this value
    ///
    /// Only scalar results surface as output; null, arrays, and objects
    /// render as nothing.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Coercion used by string concatenation
    ///
    /// Returns None for arrays and objects, which cannot be concatenated.
    pub(crate) fn concat_text(&self) -> Option<String> {
        match self {
            Value::Null => Some("null".to_string()),
            other => other.display_text(),
        }
    }

    /// Truth value used by `!`, `&&`, `||`, and ternary conditions
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(entries) => serde_json::Value::Object(
                entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Mutable variable map for one top-level render call
#[derive(Debug, Default, Clone)]
pub struct DataContext {
    vars: HashMap<String, Value>,
}

impl DataContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a context from caller-supplied JSON data
    ///
    /// A JSON object contributes one variable per key; any other JSON value
    /// yields an empty context.
    pub fn from_json(data: serde_json::Value) -> Self {
        let mut ctx = Self::new();
        if let serde_json::Value::Object(entries) = data {
            for (key, value) in entries {
                ctx.vars.insert(key, Value::from(value));
            }
        }
        ctx
    }

    /// Insert or overwrite a variable
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_scalars_only() {
        assert_eq!(Value::Number(2.0).display_text(), Some("2".to_string()));
        assert_eq!(Value::Number(2.5).display_text(), Some("2.5".to_string()));
        assert_eq!(Value::Bool(true).display_text(), Some("true".to_string()));
        assert_eq!(Value::from("hi").display_text(), Some("hi".to_string()));
        assert_eq!(Value::Null.display_text(), None);
        assert_eq!(Value::Array(vec![]).display_text(), None);
        assert_eq!(Value::Object(Default::default()).display_text(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::Number(1.0).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
    }

    #[test]
    fn test_from_json_object() {
        let ctx = DataContext::from_json(serde_json::json!({
            "title": "Home",
            "count": 3,
            "app": {"content": "body"}
        }));
        assert_eq!(ctx.get("title"), Some(&Value::from("Home")));
        assert_eq!(ctx.get("count"), Some(&Value::Number(3.0)));
        match ctx.get("app") {
            Some(Value::Object(obj)) => {
                assert_eq!(obj.get("content"), Some(&Value::from("body")))
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_non_object_is_empty() {
        let ctx = DataContext::from_json(serde_json::json!([1, 2, 3]));
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_insert_overwrites() {
        let mut ctx = DataContext::new();
        ctx.insert("x", Value::Number(1.0));
        ctx.insert("x", Value::Number(2.0));
        assert_eq!(ctx.get("x"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_json_round_trip() {
        let v = Value::from(serde_json::json!({"a": [1, "two", true, null]}));
        let back: serde_json::Value = v.into();
        assert_eq!(back, serde_json::json!({"a": [1.0, "two", true, null]}));
    }
}
