//! Generate Server Profile recurring task
//!
//! A recurring task that periodically writes a server profile to a directory
//! on the server. Maps between the resource's attribute map and the
//! recurring task endpoints of the configuration API.

use std::collections::BTreeSet;
use std::sync::Arc;

use pdconfig_client::RecurringTaskApi;
use pdconfig_client::models::{
    AddGenerateServerProfileRecurringTaskRequest, GenerateServerProfileRecurringTaskResponse,
    UpdateRequest as ApiUpdateRequest,
};
use pdconfig_core::attr::{
    Attr, bool_or_null, get_attr, int_or_null, is_empty_string, string_or_null, string_set,
};
use pdconfig_core::diagnostics::{Diagnostic, Diagnostics};
use pdconfig_core::operations::{
    Operation, add_bool_operation_if_necessary, add_int64_operation_if_necessary,
    add_string_operation_if_necessary, add_string_set_operation_if_necessary,
};
use pdconfig_core::provider::BoxFuture;
use pdconfig_core::resource::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse,
    Resource, UpdateRequest, UpdateResponse,
};
use pdconfig_core::schema::{AttributeSchema, AttributeType, ResourceSchema, TypeError, types};
use pdconfig_core::value::AttributeMap;

use super::common::{add_common_schema, read_messages};
use crate::utils::{
    check_mismatched_pd_formatted_attributes, last_updated_timestamp, pd_duration,
    report_http_error, to_api_operations,
};

pub const TYPE_NAME: &str = "generate_server_profile_recurring_task";

const CREATE_ERROR: &str =
    "An error occurred while creating the Generate Server Profile Recurring Task";
const READ_ERROR: &str =
    "An error occurred while getting the Generate Server Profile Recurring Task";
const UPDATE_ERROR: &str =
    "An error occurred while updating the Generate Server Profile Recurring Task";
const DELETE_ERROR: &str =
    "An error occurred while deleting the Generate Server Profile Recurring Task";

/// Typed view of the resource's attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateServerProfileRecurringTaskModel {
    pub id: Attr<String>,
    pub last_updated: Attr<String>,
    pub notifications: Attr<BTreeSet<String>>,
    pub required_actions: Attr<BTreeSet<String>>,
    pub profile_directory: Attr<String>,
    pub include_path: Attr<BTreeSet<String>>,
    pub retain_previous_profile_count: Attr<i64>,
    pub retain_previous_profile_age: Attr<String>,
    pub description: Attr<String>,
    pub cancel_on_task_dependency_failure: Attr<bool>,
    pub email_on_start: Attr<BTreeSet<String>>,
    pub email_on_success: Attr<BTreeSet<String>>,
    pub email_on_failure: Attr<BTreeSet<String>>,
    pub alert_on_start: Attr<bool>,
    pub alert_on_success: Attr<bool>,
    pub alert_on_failure: Attr<bool>,
}

impl GenerateServerProfileRecurringTaskModel {
    pub fn from_attributes(attributes: &AttributeMap) -> Result<Self, TypeError> {
        Ok(Self {
            id: get_attr(attributes, "id")?,
            last_updated: get_attr(attributes, "last_updated")?,
            notifications: get_attr(attributes, "notifications")?,
            required_actions: get_attr(attributes, "required_actions")?,
            profile_directory: get_attr(attributes, "profile_directory")?,
            include_path: get_attr(attributes, "include_path")?,
            retain_previous_profile_count: get_attr(attributes, "retain_previous_profile_count")?,
            retain_previous_profile_age: get_attr(attributes, "retain_previous_profile_age")?,
            description: get_attr(attributes, "description")?,
            cancel_on_task_dependency_failure: get_attr(
                attributes,
                "cancel_on_task_dependency_failure",
            )?,
            email_on_start: get_attr(attributes, "email_on_start")?,
            email_on_success: get_attr(attributes, "email_on_success")?,
            email_on_failure: get_attr(attributes, "email_on_failure")?,
            alert_on_start: get_attr(attributes, "alert_on_start")?,
            alert_on_success: get_attr(attributes, "alert_on_success")?,
            alert_on_failure: get_attr(attributes, "alert_on_failure")?,
        })
    }

    pub fn to_attributes(&self) -> AttributeMap {
        [
            ("id", self.id.to_value()),
            ("last_updated", self.last_updated.to_value()),
            ("notifications", self.notifications.to_value()),
            ("required_actions", self.required_actions.to_value()),
            ("profile_directory", self.profile_directory.to_value()),
            ("include_path", self.include_path.to_value()),
            (
                "retain_previous_profile_count",
                self.retain_previous_profile_count.to_value(),
            ),
            (
                "retain_previous_profile_age",
                self.retain_previous_profile_age.to_value(),
            ),
            ("description", self.description.to_value()),
            (
                "cancel_on_task_dependency_failure",
                self.cancel_on_task_dependency_failure.to_value(),
            ),
            ("email_on_start", self.email_on_start.to_value()),
            ("email_on_success", self.email_on_success.to_value()),
            ("email_on_failure", self.email_on_failure.to_value()),
            ("alert_on_start", self.alert_on_start.to_value()),
            ("alert_on_success", self.alert_on_success.to_value()),
            ("alert_on_failure", self.alert_on_failure.to_value()),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }

    /// Fill every unknown attribute from `prior`
    pub fn resolve_unknowns(self, prior: &Self) -> Self {
        Self {
            id: self.id.or_if_unknown(prior.id.clone()),
            last_updated: self.last_updated.or_if_unknown(prior.last_updated.clone()),
            notifications: self.notifications.or_if_unknown(prior.notifications.clone()),
            required_actions: self
                .required_actions
                .or_if_unknown(prior.required_actions.clone()),
            profile_directory: self
                .profile_directory
                .or_if_unknown(prior.profile_directory.clone()),
            include_path: self.include_path.or_if_unknown(prior.include_path.clone()),
            retain_previous_profile_count: self
                .retain_previous_profile_count
                .or_if_unknown(prior.retain_previous_profile_count.clone()),
            retain_previous_profile_age: self
                .retain_previous_profile_age
                .or_if_unknown(prior.retain_previous_profile_age.clone()),
            description: self.description.or_if_unknown(prior.description.clone()),
            cancel_on_task_dependency_failure: self
                .cancel_on_task_dependency_failure
                .or_if_unknown(prior.cancel_on_task_dependency_failure.clone()),
            email_on_start: self.email_on_start.or_if_unknown(prior.email_on_start.clone()),
            email_on_success: self
                .email_on_success
                .or_if_unknown(prior.email_on_success.clone()),
            email_on_failure: self
                .email_on_failure
                .or_if_unknown(prior.email_on_failure.clone()),
            alert_on_start: self.alert_on_start.or_if_unknown(prior.alert_on_start.clone()),
            alert_on_success: self
                .alert_on_success
                .or_if_unknown(prior.alert_on_success.clone()),
            alert_on_failure: self
                .alert_on_failure
                .or_if_unknown(prior.alert_on_failure.clone()),
        }
    }
}

/// Schema of the resource
pub fn resource_schema() -> ResourceSchema {
    let schema = ResourceSchema::new(TYPE_NAME)
        .with_description("Manages a Generate Server Profile Recurring Task.")
        .attribute(
            AttributeSchema::new("profile_directory", AttributeType::String)
                .required()
                .with_description(
                    "The directory in which the generated server profiles will be stored. \
                     The provided path may be absolute or relative to the server root.",
                )
                .with_provider_name("profileDirectory"),
        )
        .attribute(
            AttributeSchema::new("include_path", AttributeType::string_set())
                .optional()
                .computed()
                .with_description(
                    "An optional set of additional paths to files within the instance \
                     root that should be included in the generated server profile.",
                )
                .with_provider_name("includePath"),
        )
        .attribute(
            AttributeSchema::new("retain_previous_profile_count", types::positive_int())
                .optional()
                .computed()
                .with_description(
                    "The minimum number of previous server profile zip files that should be preserved.",
                )
                .with_provider_name("retainPreviousProfileCount"),
        )
        .attribute(
            AttributeSchema::new("retain_previous_profile_age", pd_duration())
                .optional()
                .with_description(
                    "The minimum age of previous server profile zip files that should be preserved.",
                )
                .with_provider_name("retainPreviousProfileAge"),
        )
        .attribute(
            AttributeSchema::new("description", AttributeType::String)
                .optional()
                .with_description("A description for this Recurring Task")
                .with_provider_name("description"),
        )
        .attribute(
            AttributeSchema::new("cancel_on_task_dependency_failure", AttributeType::Bool)
                .optional()
                .computed()
                .with_description(
                    "Indicates whether an instance of this Recurring Task should be canceled \
                     if the task immediately before it in the recurring task chain fails to \
                     complete successfully.",
                )
                .with_provider_name("cancelOnTaskDependencyFailure"),
        )
        .attribute(email_set(
            "email_on_start",
            "emailOnStart",
            "The email addresses to which a message should be sent whenever an instance of this Recurring Task starts running.",
        ))
        .attribute(email_set(
            "email_on_success",
            "emailOnSuccess",
            "The email addresses to which a message should be sent whenever an instance of this Recurring Task completes successfully.",
        ))
        .attribute(email_set(
            "email_on_failure",
            "emailOnFailure",
            "The email addresses to which a message should be sent if an instance of this Recurring Task fails to complete successfully.",
        ))
        .attribute(alert_flag(
            "alert_on_start",
            "alertOnStart",
            "Indicates whether the server should generate an administrative alert whenever an instance of this Recurring Task starts running.",
        ))
        .attribute(alert_flag(
            "alert_on_success",
            "alertOnSuccess",
            "Indicates whether the server should generate an administrative alert whenever an instance of this Recurring Task completes successfully.",
        ))
        .attribute(alert_flag(
            "alert_on_failure",
            "alertOnFailure",
            "Indicates whether the server should generate an administrative alert whenever an instance of this Recurring Task fails to complete successfully.",
        ));
    add_common_schema(schema, true)
}

fn email_set(name: &str, provider_name: &str, description: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::string_set())
        .optional()
        .computed()
        .with_description(description)
        .with_provider_name(provider_name)
}

fn alert_flag(name: &str, provider_name: &str, description: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::Bool)
        .optional()
        .computed()
        .with_description(description)
        .with_provider_name(provider_name)
}

fn defined_set(attr: &Attr<BTreeSet<String>>) -> Option<Vec<String>> {
    attr.is_defined().then(|| attr.to_sorted_vec())
}

/// Build the POST body from a plan; only defined attributes are sent
pub fn create_add_request(
    plan: &GenerateServerProfileRecurringTaskModel,
) -> Result<AddGenerateServerProfileRecurringTaskRequest, TypeError> {
    let id = plan.id.as_known().ok_or_else(|| TypeError::MissingRequired {
        name: "id".to_string(),
    })?;
    let profile_directory =
        plan.profile_directory
            .as_known()
            .ok_or_else(|| TypeError::MissingRequired {
                name: "profile_directory".to_string(),
            })?;

    let mut request = AddGenerateServerProfileRecurringTaskRequest::new(id, profile_directory);
    request.include_path = defined_set(&plan.include_path);
    request.retain_previous_profile_count = plan.retain_previous_profile_count.as_known().copied();
    request.retain_previous_profile_age = plan
        .retain_previous_profile_age
        .non_empty()
        .map(str::to_string);
    request.description = plan.description.non_empty().map(str::to_string);
    request.cancel_on_task_dependency_failure =
        plan.cancel_on_task_dependency_failure.as_known().copied();
    request.email_on_start = defined_set(&plan.email_on_start);
    request.email_on_success = defined_set(&plan.email_on_success);
    request.email_on_failure = defined_set(&plan.email_on_failure);
    request.alert_on_start = plan.alert_on_start.as_known().copied();
    request.alert_on_success = plan.alert_on_success.as_known().copied();
    request.alert_on_failure = plan.alert_on_failure.as_known().copied();
    Ok(request)
}

/// Read a server response into a model.
///
/// `expected` decides whether an absent string reads back as `""`, and
/// supplies `last_updated`, which the server does not report.
pub fn read_response(
    response: &GenerateServerProfileRecurringTaskResponse,
    expected: &GenerateServerProfileRecurringTaskModel,
) -> GenerateServerProfileRecurringTaskModel {
    let (notifications, required_actions) = read_messages(response.messages.as_ref());
    GenerateServerProfileRecurringTaskModel {
        id: Attr::Known(response.id.clone()),
        last_updated: expected.last_updated.clone(),
        notifications,
        required_actions,
        profile_directory: Attr::Known(response.profile_directory.clone()),
        include_path: string_set(response.include_path.as_deref()),
        retain_previous_profile_count: int_or_null(response.retain_previous_profile_count),
        retain_previous_profile_age: string_or_null(
            response.retain_previous_profile_age.as_deref(),
            is_empty_string(&expected.retain_previous_profile_age),
        ),
        description: string_or_null(
            response.description.as_deref(),
            is_empty_string(&expected.description),
        ),
        cancel_on_task_dependency_failure: bool_or_null(
            response.cancel_on_task_dependency_failure,
        ),
        email_on_start: string_set(response.email_on_start.as_deref()),
        email_on_success: string_set(response.email_on_success.as_deref()),
        email_on_failure: string_set(response.email_on_failure.as_deref()),
        alert_on_start: bool_or_null(response.alert_on_start),
        alert_on_success: bool_or_null(response.alert_on_success),
        alert_on_failure: bool_or_null(response.alert_on_failure),
    }
}

/// Warn about attributes the server stored in a different textual form
pub fn check_formatting(
    expected: &GenerateServerProfileRecurringTaskModel,
    state: &GenerateServerProfileRecurringTaskModel,
    diagnostics: &mut Diagnostics,
) {
    check_mismatched_pd_formatted_attributes(
        "retain_previous_profile_age",
        &expected.retain_previous_profile_age,
        &state.retain_previous_profile_age,
        diagnostics,
    );
}

/// Operations turning `state` into `plan`, in declaration order.
///
/// Paths are the provider names declared in the schema.
pub fn create_operations(
    plan: &GenerateServerProfileRecurringTaskModel,
    state: &GenerateServerProfileRecurringTaskModel,
) -> Vec<Operation> {
    let schema = resource_schema();
    let path = |attribute: &'static str| schema.property_name(attribute);
    let mut ops = Vec::new();
    add_string_operation_if_necessary(
        &mut ops,
        &plan.profile_directory,
        &state.profile_directory,
        path("profile_directory"),
    );
    add_string_set_operation_if_necessary(
        &mut ops,
        &plan.include_path,
        &state.include_path,
        path("include_path"),
    );
    add_int64_operation_if_necessary(
        &mut ops,
        &plan.retain_previous_profile_count,
        &state.retain_previous_profile_count,
        path("retain_previous_profile_count"),
    );
    add_string_operation_if_necessary(
        &mut ops,
        &plan.retain_previous_profile_age,
        &state.retain_previous_profile_age,
        path("retain_previous_profile_age"),
    );
    add_string_operation_if_necessary(
        &mut ops,
        &plan.description,
        &state.description,
        path("description"),
    );
    add_bool_operation_if_necessary(
        &mut ops,
        &plan.cancel_on_task_dependency_failure,
        &state.cancel_on_task_dependency_failure,
        path("cancel_on_task_dependency_failure"),
    );
    add_string_set_operation_if_necessary(
        &mut ops,
        &plan.email_on_start,
        &state.email_on_start,
        path("email_on_start"),
    );
    add_string_set_operation_if_necessary(
        &mut ops,
        &plan.email_on_success,
        &state.email_on_success,
        path("email_on_success"),
    );
    add_string_set_operation_if_necessary(
        &mut ops,
        &plan.email_on_failure,
        &state.email_on_failure,
        path("email_on_failure"),
    );
    add_bool_operation_if_necessary(
        &mut ops,
        &plan.alert_on_start,
        &state.alert_on_start,
        path("alert_on_start"),
    );
    add_bool_operation_if_necessary(
        &mut ops,
        &plan.alert_on_success,
        &state.alert_on_success,
        path("alert_on_success"),
    );
    add_bool_operation_if_necessary(
        &mut ops,
        &plan.alert_on_failure,
        &state.alert_on_failure,
        path("alert_on_failure"),
    );
    ops
}

/// Generate Server Profile recurring task resource
pub struct GenerateServerProfileRecurringTaskResource {
    client: Arc<dyn RecurringTaskApi>,
}

impl GenerateServerProfileRecurringTaskResource {
    pub fn new(client: Arc<dyn RecurringTaskApi>) -> Self {
        Self { client }
    }

    fn model(
        attributes: &AttributeMap,
        summary: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<GenerateServerProfileRecurringTaskModel> {
        match GenerateServerProfileRecurringTaskModel::from_attributes(attributes) {
            Ok(model) => Some(model),
            Err(e) => {
                diagnostics.add_error(summary, e.to_string());
                None
            }
        }
    }

    fn task_name<'a>(
        model: &'a GenerateServerProfileRecurringTaskModel,
        summary: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<&'a str> {
        let name = model.id.as_known().map(String::as_str);
        if name.is_none() {
            diagnostics.add_error(summary, "The id attribute must be known");
        }
        name
    }

    async fn create_task(&self, plan: AttributeMap) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(plan) = Self::model(&plan, CREATE_ERROR, &mut diagnostics) else {
            return CreateResponse {
                state: None,
                diagnostics,
            };
        };

        let request = match create_add_request(&plan) {
            Ok(request) => request,
            Err(e) => {
                diagnostics.add_error(CREATE_ERROR, e.to_string());
                return CreateResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        log::debug!("Creating recurring task {}", request.task_name);
        let response = match self.client.add_recurring_task(&request).await {
            Ok(response) => response,
            Err(e) => {
                report_http_error(&mut diagnostics, CREATE_ERROR, &e);
                return CreateResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        let mut state = read_response(&response, &plan);
        check_formatting(&plan, &state, &mut diagnostics);
        state.last_updated = Attr::Known(last_updated_timestamp());
        log::info!("Created recurring task {}", request.task_name);

        CreateResponse {
            state: Some(state.to_attributes()),
            diagnostics,
        }
    }

    async fn read_task(&self, state: AttributeMap) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(state) = Self::model(&state, READ_ERROR, &mut diagnostics) else {
            return ReadResponse {
                state: None,
                diagnostics,
            };
        };
        let Some(name) = Self::task_name(&state, READ_ERROR, &mut diagnostics) else {
            return ReadResponse {
                state: None,
                diagnostics,
            };
        };

        let response = match self.client.get_recurring_task(name).await {
            Ok(response) => response,
            Err(e) => {
                report_http_error(&mut diagnostics, READ_ERROR, &e);
                return ReadResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        ReadResponse {
            state: Some(read_response(&response, &state).to_attributes()),
            diagnostics,
        }
    }

    async fn update_task(&self, plan: AttributeMap, prior_state: AttributeMap) -> UpdateResponse {
        let mut diagnostics = Diagnostics::new();
        let (Some(plan), Some(prior)) = (
            Self::model(&plan, UPDATE_ERROR, &mut diagnostics),
            Self::model(&prior_state, UPDATE_ERROR, &mut diagnostics),
        ) else {
            return UpdateResponse {
                state: None,
                diagnostics,
            };
        };
        let Some(name) = Self::task_name(&prior, UPDATE_ERROR, &mut diagnostics) else {
            return UpdateResponse {
                state: None,
                diagnostics,
            };
        };

        if let Some(planned) = plan.id.as_known()
            && planned != name
        {
            diagnostics.push(
                Diagnostic::error(
                    UPDATE_ERROR,
                    format!(
                        "The id cannot be changed from '{}' to '{}'; delete and recreate the task",
                        name, planned
                    ),
                )
                .with_attribute("id"),
            );
            return UpdateResponse {
                state: None,
                diagnostics,
            };
        }

        let ops = create_operations(&plan, &prior);
        if ops.is_empty() {
            log::warn!(
                "No configuration API operations to apply for recurring task {}",
                name
            );
            return UpdateResponse {
                state: Some(plan.resolve_unknowns(&prior).to_attributes()),
                diagnostics,
            };
        }

        for op in &ops {
            log::debug!("Recurring task {}: {}", name, op);
        }
        let request = ApiUpdateRequest::new(to_api_operations(&ops));
        let response = match self.client.update_recurring_task(name, &request).await {
            Ok(response) => response,
            Err(e) => {
                report_http_error(&mut diagnostics, UPDATE_ERROR, &e);
                return UpdateResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        let mut state = read_response(&response, &plan);
        check_formatting(&plan, &state, &mut diagnostics);
        state.last_updated = Attr::Known(last_updated_timestamp());
        log::info!("Updated recurring task {}", name);

        UpdateResponse {
            state: Some(state.to_attributes()),
            diagnostics,
        }
    }

    async fn delete_task(&self, state: AttributeMap) -> DeleteResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(state) = Self::model(&state, DELETE_ERROR, &mut diagnostics) else {
            return DeleteResponse { diagnostics };
        };
        let Some(name) = Self::task_name(&state, DELETE_ERROR, &mut diagnostics) else {
            return DeleteResponse { diagnostics };
        };

        log::debug!("Deleting recurring task {}", name);
        match self.client.delete_recurring_task(name).await {
            Ok(()) => log::info!("Deleted recurring task {}", name),
            Err(e) => report_http_error(&mut diagnostics, DELETE_ERROR, &e),
        }
        DeleteResponse { diagnostics }
    }
}

impl Resource for GenerateServerProfileRecurringTaskResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        resource_schema()
    }

    fn create(&self, request: CreateRequest) -> BoxFuture<'_, CreateResponse> {
        Box::pin(self.create_task(request.plan))
    }

    fn read(&self, request: ReadRequest) -> BoxFuture<'_, ReadResponse> {
        Box::pin(self.read_task(request.state))
    }

    fn update(&self, request: UpdateRequest) -> BoxFuture<'_, UpdateResponse> {
        Box::pin(self.update_task(request.plan, request.prior_state))
    }

    fn delete(&self, request: DeleteRequest) -> BoxFuture<'_, DeleteResponse> {
        Box::pin(self.delete_task(request.state))
    }
}
