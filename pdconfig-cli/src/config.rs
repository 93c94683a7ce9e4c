//! Desired configuration file
//!
//! ```json
//! {
//!   "provider": { "https_host": "https://localhost:1443" },
//!   "resources": [
//!     {
//!       "type": "generate_server_profile_recurring_task",
//!       "attributes": { "id": "nightly", "profile_directory": "/opt/profiles" }
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use pdconfig_core::resource::ResourceId;
use pdconfig_core::value::{AttributeMap, attributes_from_json};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    /// Provider attributes; missing ones fall back to the environment
    #[serde(default)]
    pub provider: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceConfig {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ResourceConfig {
    /// Identifier taken from the `id` attribute
    pub fn id(&self) -> Result<ResourceId, String> {
        match self.attributes.get("id") {
            Some(serde_json::Value::String(name)) if !name.is_empty() => {
                Ok(ResourceId::new(&self.resource_type, name))
            }
            _ => Err(format!(
                "{} resource is missing a string 'id' attribute",
                self.resource_type
            )),
        }
    }

    /// Configured attributes; values with no attribute form are an error
    pub fn attributes(&self) -> Result<AttributeMap, String> {
        attributes_from_json(&self.attributes).map_err(|e| {
            let id = self
                .id()
                .map(|id| id.to_string())
                .unwrap_or_else(|_| self.resource_type.clone());
            format!("{}: {}", id, e)
        })
    }
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self, String> {
        let config: ConfigFile =
            serde_json::from_str(content).map_err(|e| format!("Parse error: {}", e))?;

        let mut seen = HashSet::new();
        for resource in &config.resources {
            let id = resource.id()?;
            if !seen.insert(id.clone()) {
                return Err(format!("Duplicate resource {}", id));
            }
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn provider_attributes(&self) -> Result<AttributeMap, String> {
        attributes_from_json(&self.provider).map_err(|e| format!("provider: {}", e))
    }
}
