//! API operations and the shared HTTP plumbing they use

pub mod recurring_task;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::configuration::Configuration;
use crate::error::ApiError;

/// Path of the configuration API below the server root
const CONFIG_PATH: &str = "config";

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

fn truncate_for_log(body: &str) -> String {
    if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    }
}

/// HTTP client for the configuration API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    configuration: Configuration,
}

impl ApiClient {
    pub fn new(configuration: Configuration) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(configuration.user_agent.clone());

        if configuration.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
            configuration,
        })
    }

    /// Build `{base}/config/{segments...}`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.configuration.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Url(format!(
                    "{} cannot be used as a base URL",
                    self.configuration.base_url
                ))
            })?
            .pop_if_empty()
            .push(CONFIG_PATH)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        log::debug!("{} {}", method, url);
        let credentials = &self.configuration.credentials;
        self.client
            .request(method, url)
            .basic_auth(&credentials.username, Some(credentials.password()))
    }

    /// Turn a non-success status into [`ApiError::Status`], keeping the body
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::debug!("Failed to read error response body: {}", e);
                String::new()
            }
        };
        log::debug!("API error: {} - {}", status, truncate_for_log(&body));
        Err(ApiError::Status { status, body })
    }

    async fn handle_response<T>(response: Response) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ApiError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Credentials;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Configuration::new(
            Url::parse(base).unwrap(),
            Credentials::new("admin", "secret"),
        ))
        .unwrap()
    }

    #[test]
    fn endpoint_appends_config_path() {
        let url = client("https://localhost:1443")
            .endpoint(&["recurring-tasks", "nightly"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://localhost:1443/config/recurring-tasks/nightly"
        );
    }

    #[test]
    fn endpoint_handles_trailing_slash_and_encoding() {
        let url = client("https://localhost:1443/")
            .endpoint(&["recurring-tasks", "Nightly Profile"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://localhost:1443/config/recurring-tasks/Nightly%20Profile"
        );
    }

    #[test]
    fn long_bodies_are_truncated_for_logging() {
        let body = "x".repeat(500);
        let logged = truncate_for_log(&body);
        assert!(logged.starts_with(&"x".repeat(200)));
        assert!(logged.ends_with("[truncated, 500 bytes total]"));
    }
}
