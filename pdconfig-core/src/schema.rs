//! Schema - Define attribute schemas for resources
//!
//! Resources declare a schema describing each attribute's type and whether it
//! is required, optional and/or computed by the server.

use std::collections::HashMap;
use std::fmt;

use serde_json::json;

use crate::value::{AttributeMap, Value};

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Int,
    Bool,
    /// Set of values of the inner type
    Set(Box<AttributeType>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
}

impl AttributeType {
    /// Set of strings
    pub fn string_set() -> Self {
        AttributeType::Set(Box::new(AttributeType::String))
    }

    /// Check if a value conforms to this type. Null and unknown conform to every type.
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (_, Value::Null | Value::Unknown) => Ok(()),
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Custom { base, validate, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|message| TypeError::ValidationFailed { message })
            }

            (AttributeType::Set(inner), Value::Set(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::SetItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Set(inner) => format!("Set<{}>", inner.type_name()),
            AttributeType::Custom { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be configured")]
    ComputedOnly { name: String },

    #[error("Set item at index {index}: {inner}")]
    SetItemError { index: usize, inner: Box<TypeError> },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    pub optional: bool,
    /// Value may be supplied by the server
    pub computed: bool,
    pub description: Option<String>,
    /// Provider-side property name (e.g., "profileDirectory")
    pub provider_name: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: false,
            computed: false,
            description: None,
            provider_name: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    /// Computed and never set from configuration
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "type": self.attr_type.to_string(),
            "required": self.required,
            "optional": self.optional,
            "computed": self.computed,
            "description": self.description,
            "provider_name": self.provider_name,
        })
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    /// Provider-side property name of an attribute, defaulting to the attribute name
    pub fn property_name<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.get(attribute)
            .and_then(|schema| schema.provider_name.as_deref())
            .unwrap_or(attribute)
    }

    /// Validate configured attributes
    pub fn validate(&self, attributes: &AttributeMap) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        // Check required attributes
        for (name, schema) in &self.attributes {
            if schema.required && attributes.get(name).is_none_or(Value::is_null) {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        // Type check each attribute
        for (name, value) in attributes {
            match self.attributes.get(name) {
                Some(schema) if schema.is_read_only() && !value.is_null() => {
                    errors.push(TypeError::ComputedOnly { name: name.clone() });
                }
                Some(schema) => {
                    if let Err(e) = schema.attr_type.validate(value) {
                        errors.push(TypeError::AttributeError {
                            name: name.clone(),
                            inner: Box::new(e),
                        });
                    }
                }
                None => errors.push(TypeError::UnknownAttribute { name: name.clone() }),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render the schema as JSON, attributes sorted by name
    pub fn to_json(&self) -> serde_json::Value {
        let mut names: Vec<&String> = self.attributes.keys().collect();
        names.sort();
        let attributes: serde_json::Map<String, serde_json::Value> = names
            .into_iter()
            .map(|name| (name.clone(), self.attributes[name].to_json()))
            .collect();
        json!({
            "resource_type": self.resource_type,
            "description": self.description,
            "attributes": attributes,
        })
    }
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Positive integer type
    pub fn positive_int() -> AttributeType {
        AttributeType::Custom {
            name: "PositiveInt".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| {
                if let Value::Int(n) = value {
                    if *n > 0 {
                        Ok(())
                    } else {
                        Err("Value must be positive".to_string())
                    }
                } else {
                    Ok(())
                }
            },
        }
    }
}
