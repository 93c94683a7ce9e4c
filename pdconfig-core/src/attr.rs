//! Attr - Three-state typed attribute values
//!
//! A planned attribute is either known, explicitly null, or unknown until
//! apply. Collapsing this to `Option<T>` would lose the difference between
//! "the user cleared it" and "the server will decide".

use std::collections::BTreeSet;

use crate::schema::TypeError;
use crate::value::{AttributeMap, Value};

/// Typed attribute value with explicit null and unknown states
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attr<T> {
    #[default]
    Null,
    Unknown,
    Known(T),
}

impl<T> Attr<T> {
    pub fn known(value: impl Into<T>) -> Self {
        Attr::Known(value.into())
    }

    /// Present and neither null nor unknown
    pub fn is_defined(&self) -> bool {
        matches!(self, Attr::Known(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    pub fn as_known(&self) -> Option<&T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Replace an unknown value with `fallback`
    pub fn or_if_unknown(self, fallback: Attr<T>) -> Attr<T> {
        match self {
            Attr::Unknown => fallback,
            other => other,
        }
    }
}

impl Attr<String> {
    /// Known and non-empty string
    pub fn non_empty(&self) -> Option<&str> {
        self.as_known().map(String::as_str).filter(|s| !s.is_empty())
    }
}

impl Attr<BTreeSet<String>> {
    /// Materialize the set as an ordered list
    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.as_known()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Types that can be carried by an [`Attr`]
pub trait AttrValue: Sized {
    fn from_value(value: &Value) -> Result<Self, TypeError>;
    fn to_value(&self) -> Value;
}

fn mismatch(expected: &str, got: &Value) -> TypeError {
    TypeError::TypeMismatch {
        expected: expected.to_string(),
        got: got.type_name(),
    }
}

impl AttrValue for String {
    fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch("String", other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl AttrValue for i64 {
    fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::Int(i) => Ok(*i),
            other => Err(mismatch("Int", other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl AttrValue for bool {
    fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("Bool", other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl AttrValue for BTreeSet<String> {
    fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::Set(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    String::from_value(item).map_err(|e| TypeError::SetItemError {
                        index,
                        inner: Box::new(e),
                    })
                })
                .collect(),
            other => Err(mismatch("Set<String>", other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::string_set(self.iter().cloned())
    }
}

impl<T: AttrValue> Attr<T> {
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::Null => Ok(Attr::Null),
            Value::Unknown => Ok(Attr::Unknown),
            other => T::from_value(other).map(Attr::Known),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Attr::Null => Value::Null,
            Attr::Unknown => Value::Unknown,
            Attr::Known(v) => v.to_value(),
        }
    }
}

/// Read a typed attribute from a map; a missing key is null
pub fn get_attr<T: AttrValue>(attributes: &AttributeMap, name: &str) -> Result<Attr<T>, TypeError> {
    match attributes.get(name) {
        Some(value) => Attr::from_value(value).map_err(|e| TypeError::AttributeError {
            name: name.to_string(),
            inner: Box::new(e),
        }),
        None => Ok(Attr::Null),
    }
}

/// Map an optional server string to an attribute.
///
/// When `empty_for_null` is set, an absent value reads back as the empty
/// string, so a configuration that explicitly set `""` does not show a diff.
pub fn string_or_null(value: Option<&str>, empty_for_null: bool) -> Attr<String> {
    match value {
        Some(s) => Attr::Known(s.to_string()),
        None if empty_for_null => Attr::Known(String::new()),
        None => Attr::Null,
    }
}

/// True when the value is a known empty string
pub fn is_empty_string(value: &Attr<String>) -> bool {
    value.as_known().is_some_and(String::is_empty)
}

pub fn int_or_null(value: Option<i64>) -> Attr<i64> {
    value.map_or(Attr::Null, Attr::Known)
}

pub fn bool_or_null(value: Option<bool>) -> Attr<bool> {
    value.map_or(Attr::Null, Attr::Known)
}

/// Map an optional server list to a known set; an absent list is the empty set
pub fn string_set(values: Option<&[String]>) -> Attr<BTreeSet<String>> {
    Attr::Known(values.unwrap_or_default().iter().cloned().collect())
}
