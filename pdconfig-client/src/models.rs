//! Request and response bodies of the configuration API
//!
//! Property names follow the API's camelCase JSON. Optional request fields
//! are omitted from the body when `None`, so the server applies its defaults.

use serde::{Deserialize, Serialize};

/// Schema URN identifying a Generate Server Profile recurring task
pub const GENERATE_SERVER_PROFILE_SCHEMA: &str =
    "urn:pingidentity:schemas:configuration:2.0:recurring-task:generate-server-profile";

/// Key of the messages block attached to configuration responses
pub const MESSAGES_SCHEMA: &str = "urn:pingidentity:schemas:configuration:messages:2.0";

/// Body of the POST that creates a Generate Server Profile recurring task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGenerateServerProfileRecurringTaskRequest {
    pub task_name: String,
    pub schemas: Vec<String>,
    pub profile_directory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_path: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retain_previous_profile_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retain_previous_profile_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_on_task_dependency_failure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_on_start: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_on_success: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_on_failure: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_on_start: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_on_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_on_failure: Option<bool>,
}

impl AddGenerateServerProfileRecurringTaskRequest {
    /// Request carrying only the required properties
    pub fn new(task_name: impl Into<String>, profile_directory: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            schemas: vec![GENERATE_SERVER_PROFILE_SCHEMA.to_string()],
            profile_directory: profile_directory.into(),
            include_path: None,
            retain_previous_profile_count: None,
            retain_previous_profile_age: None,
            description: None,
            cancel_on_task_dependency_failure: None,
            email_on_start: None,
            email_on_success: None,
            email_on_failure: None,
            alert_on_start: None,
            alert_on_success: None,
            alert_on_failure: None,
        }
    }
}

/// A Generate Server Profile recurring task as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateServerProfileRecurringTaskResponse {
    #[serde(default)]
    pub schemas: Vec<String>,
    pub id: String,
    pub profile_directory: String,
    pub include_path: Option<Vec<String>>,
    pub retain_previous_profile_count: Option<i64>,
    pub retain_previous_profile_age: Option<String>,
    pub description: Option<String>,
    pub cancel_on_task_dependency_failure: Option<bool>,
    pub email_on_start: Option<Vec<String>>,
    pub email_on_success: Option<Vec<String>>,
    pub email_on_failure: Option<Vec<String>>,
    pub alert_on_start: Option<bool>,
    pub alert_on_success: Option<bool>,
    pub alert_on_failure: Option<bool>,
    #[serde(rename = "urn:pingidentity:schemas:configuration:messages:2.0")]
    pub messages: Option<ConfigurationMessages>,
}

/// Informational output attached to a configuration response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationMessages {
    pub notifications: Option<Vec<String>>,
    pub required_actions: Option<Vec<RequiredAction>>,
}

/// Follow-up the administrator must perform for a change to take effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAction {
    pub property: Option<String>,
    #[serde(rename = "type")]
    pub action_type: String,
    pub synopsis: String,
}

/// PATCH operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Add,
    Remove,
    Replace,
}

/// One property change inside a PATCH body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub op: OperationType,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Body of a PATCH request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub operations: Vec<Operation>,
}

impl UpdateRequest {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_request_omits_unset_properties() {
        let request = AddGenerateServerProfileRecurringTaskRequest::new("nightly", "/opt/profiles");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "taskName": "nightly",
                "schemas": [GENERATE_SERVER_PROFILE_SCHEMA],
                "profileDirectory": "/opt/profiles"
            })
        );
    }

    #[test]
    fn response_reads_messages_block() {
        let response: GenerateServerProfileRecurringTaskResponse = serde_json::from_value(json!({
            "schemas": [GENERATE_SERVER_PROFILE_SCHEMA],
            "id": "nightly",
            "profileDirectory": "/opt/profiles",
            "retainPreviousProfileCount": 10,
            "urn:pingidentity:schemas:configuration:messages:2.0": {
                "notifications": ["Task scheduled"],
                "requiredActions": [
                    {"property": "profileDirectory", "type": "restart", "synopsis": "Restart required"}
                ]
            }
        }))
        .unwrap();

        assert_eq!(response.retain_previous_profile_count, Some(10));
        assert_eq!(response.include_path, None);
        let messages = response.messages.unwrap();
        assert_eq!(messages.notifications, Some(vec!["Task scheduled".to_string()]));
        assert_eq!(messages.required_actions.unwrap()[0].action_type, "restart");
    }

    #[test]
    fn operation_serializes_without_value_for_remove() {
        let request = UpdateRequest::new(vec![
            Operation {
                op: OperationType::Replace,
                path: "alertOnStart".to_string(),
                value: Some(json!(true)),
            },
            Operation {
                op: OperationType::Remove,
                path: "description".to_string(),
                value: None,
            },
        ]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"operations": [
                {"op": "replace", "path": "alertOnStart", "value": true},
                {"op": "remove", "path": "description"}
            ]})
        );
    }
}
