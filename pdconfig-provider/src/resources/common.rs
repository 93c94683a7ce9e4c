//! Attributes shared by every configuration object

use std::collections::BTreeSet;

use pdconfig_client::models::{ConfigurationMessages, RequiredAction};
use pdconfig_core::attr::{Attr, string_set};
use pdconfig_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Add `id`, `last_updated`, `notifications` and `required_actions` to a schema.
///
/// When `id_required` is false the server names the object and `id` is computed.
pub fn add_common_schema(schema: ResourceSchema, id_required: bool) -> ResourceSchema {
    let id = AttributeSchema::new("id", AttributeType::String)
        .with_description("Name of this object.")
        .with_provider_name("id");
    let id = if id_required {
        id.required()
    } else {
        id.optional().computed()
    };

    schema
        .attribute(id)
        .attribute(
            AttributeSchema::new("last_updated", AttributeType::String)
                .computed()
                .with_description("Timestamp of the last create or update of this object."),
        )
        .attribute(
            AttributeSchema::new("notifications", AttributeType::string_set())
                .computed()
                .with_description("Notifications returned by the server."),
        )
        .attribute(
            AttributeSchema::new("required_actions", AttributeType::string_set())
                .computed()
                .with_description("Actions required following a change to this object."),
        )
}

/// Render a required action as `"<type>: <synopsis>"`
pub fn format_required_action(action: &RequiredAction) -> String {
    match &action.property {
        Some(property) => format!(
            "{}: {} (property: {})",
            action.action_type, action.synopsis, property
        ),
        None => format!("{}: {}", action.action_type, action.synopsis),
    }
}

/// Read notifications and required actions from a response's messages block
pub fn read_messages(
    messages: Option<&ConfigurationMessages>,
) -> (Attr<BTreeSet<String>>, Attr<BTreeSet<String>>) {
    let notifications = string_set(messages.and_then(|m| m.notifications.as_deref()));
    let required_actions = Attr::Known(
        messages
            .and_then(|m| m.required_actions.as_ref())
            .map(|actions| actions.iter().map(format_required_action).collect())
            .unwrap_or_default(),
    );
    (notifications, required_actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_required_flag() {
        let schema = add_common_schema(ResourceSchema::new("t"), true);
        let id = schema.get("id").unwrap();
        assert!(id.required);
        assert!(!id.computed);

        let schema = add_common_schema(ResourceSchema::new("t"), false);
        let id = schema.get("id").unwrap();
        assert!(!id.required);
        assert!(id.computed);
        assert!(schema.get("required_actions").unwrap().is_read_only());
    }

    #[test]
    fn required_action_formatting() {
        let with_property = RequiredAction {
            property: Some("profileDirectory".to_string()),
            action_type: "component-restart".to_string(),
            synopsis: "Restart the task backend".to_string(),
        };
        assert_eq!(
            format_required_action(&with_property),
            "component-restart: Restart the task backend (property: profileDirectory)"
        );

        let without_property = RequiredAction {
            property: None,
            ..with_property
        };
        assert_eq!(
            format_required_action(&without_property),
            "component-restart: Restart the task backend"
        );
    }

    #[test]
    fn missing_messages_are_empty_sets() {
        let (notifications, required_actions) = read_messages(None);
        assert_eq!(notifications, Attr::Known(BTreeSet::new()));
        assert_eq!(required_actions, Attr::Known(BTreeSet::new()));
    }

    #[test]
    fn messages_are_read() {
        let messages = ConfigurationMessages {
            notifications: Some(vec!["b".to_string(), "a".to_string()]),
            required_actions: Some(vec![RequiredAction {
                property: None,
                action_type: "none".to_string(),
                synopsis: "nothing to do".to_string(),
            }]),
        };
        let (notifications, required_actions) = read_messages(Some(&messages));
        assert_eq!(notifications.to_sorted_vec(), vec!["a", "b"]);
        assert_eq!(required_actions.to_sorted_vec(), vec!["none: nothing to do"]);
    }
}
