//! Provider - Trait grouping the resource types of one product
//!
//! A Provider holds the configured API client and hands out the resource
//! types it can manage.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::resource::Resource;

/// Error type for Provider setup
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Main Provider trait
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "pingdirectory")
    fn name(&self) -> &'static str;

    /// Resource types this Provider can handle
    fn resources(&self) -> Vec<Arc<dyn Resource>>;

    /// Look up a resource type by name
    fn resource(&self, type_name: &str) -> Option<Arc<dyn Resource>> {
        self.resources()
            .into_iter()
            .find(|r| r.type_name() == type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::resource::*;
    use crate::schema::ResourceSchema;

    struct MockResource;

    impl Resource for MockResource {
        fn type_name(&self) -> &'static str {
            "mock"
        }

        fn schema(&self) -> ResourceSchema {
            ResourceSchema::new("mock")
        }

        fn create(&self, _request: CreateRequest) -> BoxFuture<'_, CreateResponse> {
            Box::pin(async { CreateResponse::default() })
        }

        fn read(&self, _request: ReadRequest) -> BoxFuture<'_, ReadResponse> {
            Box::pin(async { ReadResponse::default() })
        }

        fn update(&self, _request: UpdateRequest) -> BoxFuture<'_, UpdateResponse> {
            Box::pin(async { UpdateResponse::default() })
        }

        fn delete(&self, _request: DeleteRequest) -> BoxFuture<'_, DeleteResponse> {
            Box::pin(async {
                DeleteResponse {
                    diagnostics: Diagnostics::new(),
                }
            })
        }
    }

    struct MockProvider;

    impl Provider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn resources(&self) -> Vec<Arc<dyn Resource>> {
            vec![Arc::new(MockResource)]
        }
    }

    #[test]
    fn provider_finds_resource_by_name() {
        assert!(MockProvider.resource("mock").is_some());
        assert!(MockProvider.resource("other").is_none());
    }

    #[test]
    fn provider_error_keeps_cause() {
        use std::error::Error;

        let io = std::io::Error::other("refused");
        let err = ProviderError::new("Failed to build client").with_cause(io);
        assert_eq!(err.to_string(), "Failed to build client");
        assert!(err.source().is_some());
    }
}
