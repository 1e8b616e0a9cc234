use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dynamic value type for node inputs/outputs and flow variables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Traverse a dotted path ("user.address.city") into nested objects.
    /// Array segments may be numeric indices. Any missing segment yields None.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Literal form used by template substitution: strings render raw
    /// (no quotes), everything else renders as its JSON text.
    pub fn display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::String(s) => s.clone(),
            other => serde_json::to_string(&other.to_json()).unwrap_or_default(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::Object(HashMap::from([
            (
                "user".to_string(),
                Value::Object(HashMap::from([
                    ("name".to_string(), Value::String("ada".to_string())),
                    (
                        "tags".to_string(),
                        Value::Array(vec![Value::String("admin".to_string())]),
                    ),
                ])),
            ),
            ("count".to_string(), Value::Number(3.0)),
        ]))
    }

    #[test]
    fn path_traversal_hits_nested_fields() {
        let v = sample();
        assert_eq!(v.get_path("user.name").and_then(|v| v.as_str()), Some("ada"));
        assert_eq!(
            v.get_path("user.tags.0").and_then(|v| v.as_str()),
            Some("admin")
        );
        assert_eq!(v.get_path("count").and_then(|v| v.as_f64()), Some(3.0));
    }

    #[test]
    fn path_traversal_missing_segment_is_none() {
        let v = sample();
        assert!(v.get_path("user.missing").is_none());
        assert!(v.get_path("user.name.deeper").is_none());
        assert!(v.get_path("user.tags.7").is_none());
    }

    #[test]
    fn display_string_renders_literals() {
        assert_eq!(Value::String("vip".to_string()).display_string(), "vip");
        assert_eq!(Value::Number(42.0).display_string(), "42");
        assert_eq!(Value::Number(1.5).display_string(), "1.5");
        assert_eq!(Value::Bool(true).display_string(), "true");
        assert_eq!(Value::Null.display_string(), "null");
    }

    #[test]
    fn json_round_trip() {
        let v = sample();
        assert_eq!(Value::from(v.to_json()), v);
    }
}
