//! Operations - Field-level changes computed from a plan/state diff
//!
//! Each helper compares one planned attribute with its current state and
//! appends at most one operation. Called in declaration order, they produce
//! the body of a single PATCH request.

use std::collections::BTreeSet;
use std::fmt;

use crate::attr::Attr;

/// Kind of change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Replace,
    Remove,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Replace => write!(f, "replace"),
            OperationKind::Remove => write!(f, "remove"),
        }
    }
}

/// New value carried by a replace operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationValue {
    String(String),
    Bool(bool),
    Int(i64),
    StringSet(Vec<String>),
}

impl OperationValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OperationValue::String(s) => serde_json::Value::String(s.clone()),
            OperationValue::Bool(b) => serde_json::Value::Bool(*b),
            OperationValue::Int(i) => serde_json::Value::from(*i),
            OperationValue::StringSet(items) => serde_json::Value::from(items.clone()),
        }
    }
}

impl fmt::Display for OperationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationValue::String(s) => write!(f, "{:?}", s),
            OperationValue::Bool(b) => write!(f, "{}", b),
            OperationValue::Int(i) => write!(f, "{}", i),
            OperationValue::StringSet(items) => write!(f, "{:?}", items),
        }
    }
}

/// A named field-level change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Provider-side property name
    pub path: String,
    pub value: Option<OperationValue>,
}

impl Operation {
    pub fn replace(path: impl Into<String>, value: OperationValue) -> Self {
        Self {
            kind: OperationKind::Replace,
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Remove,
            path: path.into(),
            value: None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {} = {}", self.kind, self.path, value),
            None => write!(f, "{} {}", self.kind, self.path),
        }
    }
}

/// Append a string operation if the planned value differs.
///
/// Null and empty are the same value; clearing a set string removes it.
pub fn add_string_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Attr<String>,
    state: &Attr<String>,
    path: &str,
) {
    if plan.is_unknown() {
        return;
    }
    let planned = plan.non_empty();
    if planned == state.non_empty() {
        return;
    }
    match planned {
        Some(s) => ops.push(Operation::replace(
            path,
            OperationValue::String(s.to_string()),
        )),
        None => ops.push(Operation::remove(path)),
    }
}

/// Append a boolean operation if the planned value differs
pub fn add_bool_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Attr<bool>,
    state: &Attr<bool>,
    path: &str,
) {
    if plan.is_unknown() || plan == state {
        return;
    }
    match plan.as_known() {
        Some(b) => ops.push(Operation::replace(path, OperationValue::Bool(*b))),
        None => ops.push(Operation::remove(path)),
    }
}

/// Append an integer operation if the planned value differs
pub fn add_int64_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Attr<i64>,
    state: &Attr<i64>,
    path: &str,
) {
    if plan.is_unknown() || plan == state {
        return;
    }
    match plan.as_known() {
        Some(i) => ops.push(Operation::replace(path, OperationValue::Int(*i))),
        None => ops.push(Operation::remove(path)),
    }
}

/// Append a string-set operation if the planned set differs.
///
/// The whole set is replaced; a null plan replaces with the empty set.
pub fn add_string_set_operation_if_necessary(
    ops: &mut Vec<Operation>,
    plan: &Attr<BTreeSet<String>>,
    state: &Attr<BTreeSet<String>>,
    path: &str,
) {
    if plan.is_unknown() {
        return;
    }
    let empty = BTreeSet::new();
    let planned = plan.as_known().unwrap_or(&empty);
    let current = state.as_known().unwrap_or(&empty);
    if planned == current {
        return;
    }
    ops.push(Operation::replace(
        path,
        OperationValue::StringSet(planned.iter().cloned().collect()),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> Attr<BTreeSet<String>> {
        Attr::Known(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn equal_strings_produce_nothing() {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(
            &mut ops,
            &Attr::known("/opt/profiles"),
            &Attr::known("/opt/profiles"),
            "profileDirectory",
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn empty_string_equals_null() {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(&mut ops, &Attr::known(""), &Attr::Null, "description");
        add_string_operation_if_necessary(&mut ops, &Attr::Null, &Attr::known(""), "description");
        assert!(ops.is_empty());
    }

    #[test]
    fn clearing_a_string_removes_it() {
        let mut ops = Vec::new();
        add_string_operation_if_necessary(
            &mut ops,
            &Attr::Null,
            &Attr::known("nightly"),
            "description",
        );
        assert_eq!(ops, vec![Operation::remove("description")]);
    }

    #[test]
    fn unknown_plan_is_skipped() {
        let mut ops = Vec::new();
        add_int64_operation_if_necessary(
            &mut ops,
            &Attr::Unknown,
            &Attr::Known(3),
            "retainPreviousProfileCount",
        );
        add_string_set_operation_if_necessary(&mut ops, &Attr::Unknown, &set(&["a"]), "emailOnStart");
        assert!(ops.is_empty());
    }

    #[test]
    fn bool_change_is_replaced() {
        let mut ops = Vec::new();
        add_bool_operation_if_necessary(
            &mut ops,
            &Attr::Known(true),
            &Attr::Known(false),
            "alertOnStart",
        );
        assert_eq!(
            ops,
            vec![Operation::replace("alertOnStart", OperationValue::Bool(true))]
        );
        assert_eq!(ops[0].to_string(), "replace alertOnStart = true");
    }

    #[test]
    fn set_change_replaces_whole_set_in_order() {
        let mut ops = Vec::new();
        add_string_set_operation_if_necessary(
            &mut ops,
            &set(&["b@example.com", "a@example.com"]),
            &set(&["a@example.com"]),
            "emailOnFailure",
        );
        assert_eq!(
            ops,
            vec![Operation::replace(
                "emailOnFailure",
                OperationValue::StringSet(vec![
                    "a@example.com".to_string(),
                    "b@example.com".to_string()
                ])
            )]
        );
    }

    #[test]
    fn null_set_equals_empty_set() {
        let mut ops = Vec::new();
        add_string_set_operation_if_necessary(&mut ops, &Attr::Null, &set(&[]), "includePath");
        assert!(ops.is_empty());
    }

    #[test]
    fn operation_value_json() {
        assert_eq!(OperationValue::Int(5).to_json(), serde_json::json!(5));
        assert_eq!(
            OperationValue::StringSet(vec!["a".to_string()]).to_json(),
            serde_json::json!(["a"])
        );
    }
}
