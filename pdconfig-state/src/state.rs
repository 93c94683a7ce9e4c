//! State file structures

use serde::{Deserialize, Serialize};

use pdconfig_core::resource::ResourceId;
use pdconfig_core::value::{AttributeMap, attributes_from_json, attributes_to_json};

use crate::backend::{BackendError, BackendResult};

/// Persisted record of every managed resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file format version
    pub version: u32,
    /// Incremented on every write
    pub serial: u64,
    /// Identifies this state across writes; never changes after creation
    pub lineage: String,
    /// Version of pdconfig that last wrote this state
    pub pdconfig_version: String,
    pub resources: Vec<ResourceState>,
}

impl StateFile {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            serial: 0,
            lineage: uuid::Uuid::new_v4().to_string(),
            pdconfig_version: env!("CARGO_PKG_VERSION").to_string(),
            resources: Vec::new(),
        }
    }

    /// Prepare for a write
    pub fn increment_serial(&mut self) {
        self.serial += 1;
        self.pdconfig_version = env!("CARGO_PKG_VERSION").to_string();
    }

    pub fn find_resource(&self, id: &ResourceId) -> Option<&ResourceState> {
        self.resources.iter().find(|r| r.matches(id))
    }

    /// Insert or replace the entry for the resource
    pub fn upsert_resource(&mut self, resource: ResourceState) {
        let id = resource.id();
        match self.resources.iter_mut().find(|r| r.matches(&id)) {
            Some(existing) => *existing = resource,
            None => self.resources.push(resource),
        }
    }

    pub fn remove_resource(&mut self, id: &ResourceId) -> Option<ResourceState> {
        let pos = self.resources.iter().position(|r| r.matches(id))?;
        Some(self.resources.remove(pos))
    }

    /// Check that every stored resource converts back to attributes
    pub fn validate(&self) -> BackendResult<()> {
        self.resources
            .iter()
            .try_for_each(|r| r.to_attributes().map(drop))
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Last applied attributes of one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// e.g. "generate_server_profile_recurring_task"
    pub resource_type: String,
    /// Server-side identifier
    pub name: String,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ResourceState {
    /// Build from an attribute map; `None` when any value is still unknown
    pub fn from_attributes(id: &ResourceId, attributes: &AttributeMap) -> Option<Self> {
        Some(Self {
            resource_type: id.resource_type.clone(),
            name: id.name.clone(),
            attributes: attributes_to_json(attributes)?,
        })
    }

    pub fn id(&self) -> ResourceId {
        ResourceId::new(&self.resource_type, &self.name)
    }

    pub fn to_attributes(&self) -> BackendResult<AttributeMap> {
        attributes_from_json(&self.attributes)
            .map_err(|e| BackendError::InvalidState(format!("{}: {}", self.id(), e)))
    }

    fn matches(&self, id: &ResourceId) -> bool {
        self.resource_type == id.resource_type && self.name == id.name
    }
}
