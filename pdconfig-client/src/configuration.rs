//! Connection settings for the configuration API

use std::fmt;

use url::Url;

/// Basic authentication credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Configuration used to build an [`crate::ApiClient`]
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Server root, e.g. `https://localhost:1443`
    pub base_url: Url,
    pub credentials: Credentials,
    pub user_agent: String,
    /// Trust any server certificate
    pub accept_invalid_certs: bool,
}

impl Configuration {
    pub const DEFAULT_USER_AGENT: &'static str = concat!("pdconfig/", env!("CARGO_PKG_VERSION"));

    pub fn new(base_url: Url, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}
