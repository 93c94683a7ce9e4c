//! Resource type implementations

use pdconfig_core::schema::ResourceSchema;

pub mod common;
pub mod generate_server_profile_recurring_task;

/// Schemas of every resource type, available without a configured provider
pub fn all_schemas() -> Vec<ResourceSchema> {
    vec![generate_server_profile_recurring_task::resource_schema()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_are_named_by_type() {
        let types: Vec<String> = all_schemas().into_iter().map(|s| s.resource_type).collect();
        assert_eq!(types, vec![generate_server_profile_recurring_task::TYPE_NAME]);
    }
}
