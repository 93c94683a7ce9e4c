//! Turn configured attributes into the plan handed to a resource

use pdconfig_core::schema::ResourceSchema;
use pdconfig_core::value::{AttributeMap, Value};

/// Build the planned attribute map.
///
/// Configured values are taken as-is. Anything left unset is decided by the
/// schema: server-computed attributes keep the prior value, or are unknown
/// when there is no prior state; the rest are null.
pub fn plan_attributes(
    schema: &ResourceSchema,
    config: &AttributeMap,
    prior: Option<&AttributeMap>,
) -> AttributeMap {
    schema
        .attributes
        .values()
        .map(|attr| {
            let value = match config.get(&attr.name) {
                Some(value) => value.clone(),
                None if attr.computed => match prior {
                    Some(prior) => prior.get(&attr.name).cloned().unwrap_or(Value::Unknown),
                    None => Value::Unknown,
                },
                None => Value::Null,
            };
            (attr.name.clone(), value)
        })
        .collect()
}

/// Names of attributes whose planned value differs from `state`, sorted
pub fn changed_attributes(plan: &AttributeMap, state: &AttributeMap) -> Vec<String> {
    let mut changed: Vec<String> = plan
        .iter()
        .filter(|(name, value)| !value.is_unknown() && state.get(*name) != Some(*value))
        .map(|(name, _)| name.clone())
        .collect();
    changed.sort();
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdconfig_core::schema::{AttributeSchema, AttributeType};

    fn schema() -> ResourceSchema {
        ResourceSchema::new("task")
            .attribute(AttributeSchema::new("id", AttributeType::String).required())
            .attribute(AttributeSchema::new("description", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("count", AttributeType::Int)
                    .optional()
                    .computed(),
            )
            .attribute(AttributeSchema::new("last_updated", AttributeType::String).computed())
    }

    fn config() -> AttributeMap {
        let mut config = AttributeMap::new();
        config.insert("id".to_string(), Value::from("nightly"));
        config
    }

    fn prior() -> AttributeMap {
        let mut prior = config();
        prior.insert("description".to_string(), Value::from("old"));
        prior.insert("count".to_string(), Value::Int(10));
        prior.insert(
            "last_updated".to_string(),
            Value::from("Monday, 02-Jan-26 15:04:05 UTC"),
        );
        prior
    }

    #[test]
    fn create_marks_computed_attributes_unknown() {
        let plan = plan_attributes(&schema(), &config(), None);
        assert_eq!(plan.get("id"), Some(&Value::from("nightly")));
        assert_eq!(plan.get("description"), Some(&Value::Null));
        assert_eq!(plan.get("count"), Some(&Value::Unknown));
        assert_eq!(plan.get("last_updated"), Some(&Value::Unknown));
    }

    #[test]
    fn update_keeps_prior_computed_values() {
        let prior = prior();
        let plan = plan_attributes(&schema(), &config(), Some(&prior));
        assert_eq!(plan.get("count"), Some(&Value::Int(10)));
        assert_eq!(plan.get("last_updated"), prior.get("last_updated"));
        // optional-only attributes are cleared when removed from configuration
        assert_eq!(plan.get("description"), Some(&Value::Null));
        assert_eq!(changed_attributes(&plan, &prior), vec!["description"]);
    }

    #[test]
    fn unchanged_configuration_has_no_changes() {
        let prior = prior();
        let mut config = config();
        config.insert("description".to_string(), Value::from("old"));
        let plan = plan_attributes(&schema(), &config, Some(&prior));
        assert!(changed_attributes(&plan, &prior).is_empty());
    }
}
