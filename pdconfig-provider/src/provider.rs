//! Directory server provider implementation
//!
//! Holds the configured API client and hands it to every resource type.

use std::fmt;
use std::sync::Arc;

use pdconfig_client::{ApiClient, Configuration, Credentials, RecurringTaskApi};
use pdconfig_core::provider::{Provider, ProviderError, ProviderResult};
use pdconfig_core::resource::Resource;
use pdconfig_core::value::{AttributeMap, Value};
use url::Url;

use crate::resources::generate_server_profile_recurring_task::GenerateServerProfileRecurringTaskResource;

pub const HTTPS_HOST_ENV: &str = "PINGDIRECTORY_PROVIDER_HTTPS_HOST";
pub const USERNAME_ENV: &str = "PINGDIRECTORY_PROVIDER_USERNAME";
pub const PASSWORD_ENV: &str = "PINGDIRECTORY_PROVIDER_PASSWORD";
pub const INSECURE_TRUST_ALL_TLS_ENV: &str = "PINGDIRECTORY_PROVIDER_INSECURE_TRUST_ALL_TLS";
pub const PRODUCT_VERSION_ENV: &str = "PINGDIRECTORY_PROVIDER_PRODUCT_VERSION";

/// Provider settings
#[derive(Clone)]
pub struct ProviderConfig {
    /// e.g. `https://localhost:1443`
    pub https_host: String,
    pub username: String,
    password: String,
    /// Trust any server certificate
    pub insecure_trust_all_tls: bool,
    /// Version of the directory server, informational
    pub product_version: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("https_host", &self.https_host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("insecure_trust_all_tls", &self.insecure_trust_all_tls)
            .field("product_version", &self.product_version)
            .finish()
    }
}

fn get_string<'a>(attributes: &'a AttributeMap, key: &str) -> Option<&'a str> {
    match attributes.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

fn get_bool(attributes: &AttributeMap, key: &str) -> Option<bool> {
    match attributes.get(key) {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    }
}

impl ProviderConfig {
    pub fn new(
        https_host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            https_host: https_host.into(),
            username: username.into(),
            password: password.into(),
            insecure_trust_all_tls: false,
            product_version: None,
        }
    }

    pub fn with_insecure_trust_all_tls(mut self, insecure: bool) -> Self {
        self.insecure_trust_all_tls = insecure;
        self
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Build from provider attributes, falling back to `PINGDIRECTORY_PROVIDER_*` variables
    pub fn from_attributes(attributes: &AttributeMap) -> ProviderResult<Self> {
        Self::from_sources(attributes, |key| std::env::var(key).ok())
    }

    /// Build from provider attributes with an explicit environment lookup
    pub fn from_sources(
        attributes: &AttributeMap,
        env: impl Fn(&str) -> Option<String>,
    ) -> ProviderResult<Self> {
        let lookup = |attribute: &str, variable: &str| -> Option<String> {
            get_string(attributes, attribute)
                .map(str::to_string)
                .or_else(|| env(variable).filter(|v| !v.is_empty()))
        };
        let required = |attribute: &str, variable: &str| -> ProviderResult<String> {
            lookup(attribute, variable).ok_or_else(|| {
                ProviderError::new(format!(
                    "Missing provider attribute '{}' (or environment variable {})",
                    attribute, variable
                ))
            })
        };

        let https_host = required("https_host", HTTPS_HOST_ENV)?;
        let username = required("username", USERNAME_ENV)?;
        let password = required("password", PASSWORD_ENV)?;

        let insecure_trust_all_tls = match get_bool(attributes, "insecure_trust_all_tls") {
            Some(b) => b,
            None => match env(INSECURE_TRUST_ALL_TLS_ENV) {
                Some(v) => v.parse::<bool>().map_err(|e| {
                    ProviderError::new(format!(
                        "Invalid value '{}' for {}",
                        v, INSECURE_TRUST_ALL_TLS_ENV
                    ))
                    .with_cause(e)
                })?,
                None => false,
            },
        };

        Ok(Self {
            https_host,
            username,
            password,
            insecure_trust_all_tls,
            product_version: lookup("product_version", PRODUCT_VERSION_ENV),
        })
    }

    /// Client configuration for these settings
    pub fn configuration(&self) -> ProviderResult<Configuration> {
        let base_url = Url::parse(&self.https_host).map_err(|e| {
            ProviderError::new(format!("Invalid https_host '{}'", self.https_host)).with_cause(e)
        })?;

        let mut user_agent = Configuration::DEFAULT_USER_AGENT.to_string();
        if let Some(version) = &self.product_version {
            user_agent.push_str(&format!(" pingdirectory/{}", version));
        }

        Ok(
            Configuration::new(base_url, Credentials::new(&self.username, &self.password))
                .with_user_agent(user_agent)
                .with_accept_invalid_certs(self.insecure_trust_all_tls),
        )
    }
}

/// Directory server provider
pub struct PingDirectoryProvider {
    client: Arc<dyn RecurringTaskApi>,
}

impl PingDirectoryProvider {
    /// Create a provider talking to the configured server
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        if config.insecure_trust_all_tls {
            log::warn!("Trusting all TLS certificates presented by {}", config.https_host);
        }
        let client = ApiClient::new(config.configuration()?)
            .map_err(|e| ProviderError::new("Failed to build HTTP client").with_cause(e))?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Create a provider around an existing client
    pub fn with_client(client: Arc<dyn RecurringTaskApi>) -> Self {
        Self { client }
    }
}

impl Provider for PingDirectoryProvider {
    fn name(&self) -> &'static str {
        "pingdirectory"
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        vec![Arc::new(GenerateServerProfileRecurringTaskResource::new(
            self.client.clone(),
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn attributes_take_precedence_over_environment() {
        let mut attributes = AttributeMap::new();
        attributes.insert(
            "https_host".to_string(),
            Value::from("https://pd.example.com:1443"),
        );
        let env = env_from(&[
            (HTTPS_HOST_ENV, "https://other:1443"),
            (USERNAME_ENV, "cn=administrator"),
            (PASSWORD_ENV, "secret"),
        ]);

        let config = ProviderConfig::from_sources(&attributes, env).unwrap();
        assert_eq!(config.https_host, "https://pd.example.com:1443");
        assert_eq!(config.username, "cn=administrator");
        assert_eq!(config.password(), "secret");
        assert!(!config.insecure_trust_all_tls);
    }

    #[test]
    fn missing_password_is_an_error() {
        let env = env_from(&[(HTTPS_HOST_ENV, "https://pd:1443"), (USERNAME_ENV, "admin")]);
        let err = ProviderConfig::from_sources(&AttributeMap::new(), env).unwrap_err();
        assert!(err.to_string().contains(PASSWORD_ENV));
    }

    #[test]
    fn insecure_flag_from_environment() {
        let env = env_from(&[
            (HTTPS_HOST_ENV, "https://pd:1443"),
            (USERNAME_ENV, "admin"),
            (PASSWORD_ENV, "secret"),
            (INSECURE_TRUST_ALL_TLS_ENV, "true"),
        ]);
        let config = ProviderConfig::from_sources(&AttributeMap::new(), env).unwrap();
        assert!(config.insecure_trust_all_tls);
    }

    #[test]
    fn invalid_insecure_flag_is_an_error() {
        let env = env_from(&[
            (HTTPS_HOST_ENV, "https://pd:1443"),
            (USERNAME_ENV, "admin"),
            (PASSWORD_ENV, "secret"),
            (INSECURE_TRUST_ALL_TLS_ENV, "sometimes"),
        ]);
        assert!(ProviderConfig::from_sources(&AttributeMap::new(), env).is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let config = ProviderConfig::new("https://pd:1443", "admin", "2FederateM0re");
        assert!(!format!("{:?}", config).contains("2FederateM0re"));
    }

    #[test]
    fn configuration_carries_product_version() {
        let mut config = ProviderConfig::new("https://pd:1443", "admin", "secret")
            .with_insecure_trust_all_tls(true);
        config.product_version = Some("9.3.0.0".to_string());

        let configuration = config.configuration().unwrap();
        assert!(configuration.accept_invalid_certs);
        assert!(configuration.user_agent.ends_with("pingdirectory/9.3.0.0"));
        assert_eq!(configuration.base_url.as_str(), "https://pd:1443/");
    }

    #[test]
    fn invalid_host_is_an_error() {
        let config = ProviderConfig::new("not a url", "admin", "secret");
        assert!(config.configuration().is_err());
    }

    #[test]
    fn provider_lists_recurring_task_resource() {
        let provider =
            PingDirectoryProvider::new(&ProviderConfig::new("https://pd:1443", "admin", "secret"))
                .unwrap();
        assert_eq!(provider.name(), "pingdirectory");
        assert!(
            provider
                .resource("generate_server_profile_recurring_task")
                .is_some()
        );
    }
}
