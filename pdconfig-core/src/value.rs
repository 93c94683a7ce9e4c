//! Value - Generic attribute values exchanged with the plan/apply engine
//!
//! Plans and states travel between the engine and a resource as flat
//! `AttributeMap`s. Resources convert them to typed models with [`crate::attr::Attr`].

use std::collections::HashMap;

use crate::schema::TypeError;

/// Generic container for plan and state attributes
pub type AttributeMap = HashMap<String, Value>;

/// Attribute value of a resource
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Explicitly absent
    #[default]
    Null,
    /// Not known until apply (computed by the server)
    Unknown,
    String(String),
    Int(i64),
    Bool(bool),
    /// Unordered collection without duplicates
    Set(Vec<Value>),
}

impl Value {
    /// Build a set of strings
    pub fn string_set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<String> = items.into_iter().map(Into::into).collect();
        items.sort();
        items.dedup();
        Value::Set(items.into_iter().map(Value::String).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Returns true if the value, or anything nested in it, is unknown
    pub fn contains_unknown(&self) -> bool {
        match self {
            Value::Unknown => true,
            Value::Set(items) => items.iter().any(Value::contains_unknown),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "Null".to_string(),
            Value::Unknown => "Unknown".to_string(),
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::Set(_) => "Set".to_string(),
        }
    }

    /// Convert to JSON for persistence. Unknown values have no JSON form.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Unknown => None,
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Int(i) => Some(serde_json::Value::from(*i)),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Set(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
        }
    }

    /// Convert from JSON. Arrays become sets; fractional numbers, integers
    /// outside `i64` and objects are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TypeError> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) if n.is_f64() => Err(TypeError::TypeMismatch {
                expected: "Int".to_string(),
                got: format!("Float ({})", n),
            }),
            serde_json::Value::Number(n) => {
                n.as_i64()
                    .map(Value::Int)
                    .ok_or_else(|| TypeError::ValidationFailed {
                        message: format!("Integer {} is out of range", n),
                    })
            }
            serde_json::Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    Value::from_json(item).map_err(|e| TypeError::SetItemError {
                        index,
                        inner: Box::new(e),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Set),
            serde_json::Value::Object(_) => Err(TypeError::TypeMismatch {
                expected: "String, Int, Bool or Set".to_string(),
                got: "Object".to_string(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Unknown, Value::Unknown) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            // Sets compare without regard to order
            (Value::Set(a), Value::Set(b)) => {
                a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x))
            }
            _ => false,
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

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Convert an attribute map to JSON, dropping nothing but failing on unknowns
pub fn attributes_to_json(
    attributes: &AttributeMap,
) -> Option<serde_json::Map<String, serde_json::Value>> {
    attributes
        .iter()
        .map(|(k, v)| v.to_json().map(|j| (k.clone(), j)))
        .collect()
}

/// Convert JSON attributes to an attribute map; the error names the first
/// attribute whose value cannot be represented
pub fn attributes_from_json(
    attributes: &serde_json::Map<String, serde_json::Value>,
) -> Result<AttributeMap, TypeError> {
    attributes
        .iter()
        .map(|(k, v)| {
            Value::from_json(v)
                .map(|v| (k.clone(), v))
                .map_err(|e| TypeError::AttributeError {
                    name: k.clone(),
                    inner: Box::new(e),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sets_compare_without_order() {
        let a = Value::Set(vec![Value::from("a"), Value::from("b")]);
        let b = Value::Set(vec![Value::from("b"), Value::from("a")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::string_set(["a"]));
    }

    #[test]
    fn string_set_sorts_and_dedups() {
        let set = Value::string_set(["b", "a", "b"]);
        match set {
            Value::Set(items) => {
                assert_eq!(items, vec![Value::from("a"), Value::from("b")]);
            }
            _ => panic!("Expected Set"),
        }
    }

    #[test]
    fn unknown_has_no_json_form() {
        assert!(Value::Unknown.to_json().is_none());
        assert!(Value::Set(vec![Value::Unknown]).to_json().is_none());
        assert!(Value::Set(vec![Value::Unknown]).contains_unknown());
    }

    #[test]
    fn json_conversion() {
        assert_eq!(Value::from_json(&json!("x")).unwrap(), Value::from("x"));
        assert_eq!(Value::from_json(&json!(3)).unwrap(), Value::Int(3));
        assert_eq!(Value::from_json(&json!(null)).unwrap(), Value::Null);
        assert_eq!(
            Value::from_json(&json!(["a", "b"])).unwrap(),
            Value::string_set(["a", "b"])
        );
        assert_eq!(Value::Bool(true).to_json(), Some(json!(true)));
    }

    #[test]
    fn unrepresentable_json_is_rejected() {
        assert!(matches!(
            Value::from_json(&json!(2.5)),
            Err(TypeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Value::from_json(&json!(u64::MAX)),
            Err(TypeError::ValidationFailed { .. })
        ));
        assert!(matches!(
            Value::from_json(&json!({"k": 1})),
            Err(TypeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Value::from_json(&json!(["a", {"k": 1}])),
            Err(TypeError::SetItemError { index: 1, .. })
        ));
    }

    #[test]
    fn attributes_from_json_names_the_bad_attribute() {
        let json = json!({
            "id": "nightly",
            "retain_previous_profile_count": 2.5
        });
        let err = attributes_from_json(json.as_object().unwrap()).unwrap_err();
        match &err {
            TypeError::AttributeError { name, .. } => {
                assert_eq!(name, "retain_previous_profile_count");
            }
            other => panic!("Expected AttributeError, got {:?}", other),
        }
        assert!(err.to_string().contains("Float"));

        let json = json!({"id": "nightly", "alert_on_start": true});
        let attrs = attributes_from_json(json.as_object().unwrap()).unwrap();
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn attributes_json_conversion_rejects_unknown() {
        let mut attrs = AttributeMap::new();
        attrs.insert("id".to_string(), Value::from("task"));
        assert!(attributes_to_json(&attrs).is_some());

        attrs.insert("count".to_string(), Value::Unknown);
        assert!(attributes_to_json(&attrs).is_none());
    }
}
