//! Resource - Lifecycle contract between the plan/apply engine and a resource type
//!
//! The engine calls one handler at a time per resource instance, passing the
//! relevant plan and state maps. Handlers never fail with `Err`: every problem
//! is reported as a diagnostic, and a fatal one leaves `state` empty.

use crate::diagnostics::Diagnostics;
use crate::provider::BoxFuture;
use crate::schema::ResourceSchema;
use crate::value::{AttributeMap, Value};

/// Unique identifier for a managed resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource type (e.g., "generate_server_profile_recurring_task")
    pub resource_type: String,
    /// Identifier on the server
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub plan: AttributeMap,
}

#[derive(Debug, Clone, Default)]
pub struct CreateResponse {
    pub state: Option<AttributeMap>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub state: AttributeMap,
}

#[derive(Debug, Clone, Default)]
pub struct ReadResponse {
    pub state: Option<AttributeMap>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub plan: AttributeMap,
    pub prior_state: AttributeMap,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateResponse {
    pub state: Option<AttributeMap>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub state: AttributeMap,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteResponse {
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct ImportStateRequest {
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportStateResponse {
    pub state: Option<AttributeMap>,
    pub diagnostics: Diagnostics,
}

/// A managed resource type
pub trait Resource: Send + Sync {
    /// Resource type name (e.g., "generate_server_profile_recurring_task")
    fn type_name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;

    fn create(&self, request: CreateRequest) -> BoxFuture<'_, CreateResponse>;

    /// Refresh state from the server
    fn read(&self, request: ReadRequest) -> BoxFuture<'_, ReadResponse>;

    fn update(&self, request: UpdateRequest) -> BoxFuture<'_, UpdateResponse>;

    fn delete(&self, request: DeleteRequest) -> BoxFuture<'_, DeleteResponse>;

    /// Start tracking an existing object.
    ///
    /// The identifier becomes the `id` attribute; a following read fills in the rest.
    fn import_state(&self, request: ImportStateRequest) -> ImportStateResponse {
        let mut state = AttributeMap::new();
        state.insert("id".to_string(), Value::String(request.id));
        ImportStateResponse {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }
}
