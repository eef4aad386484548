//! HTTP implementation of the Catalyst API
//!
//! Talks to the cloud runtime and management APIs with a bearer API key.

use crate::api::{OrganizationApi, ProjectApi, RegionApi};
use crate::error::{ClientError, Result};
use crate::types::{CreateRegionResponse, Organization, Project, Region, User};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Deserialize;
use std::time::Duration;

const RUNTIME_API: [&str; 3] = ["apis", "cra.diagrid.io", "v1beta1"];
const MANAGEMENT_API: [&str; 2] = ["api", "v1"];

/// Client configuration
#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub retry: RetryConfig,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            retry: RetryConfig::default(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("retry", &self.retry)
            .finish()
    }
}

/// Transport-level retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Delay before retry number `attempt` (0-based)
    ///
    /// Never exceeds `max_delay`, including when the backoff overflows.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        Duration::try_from_secs_f64(self.initial_delay.as_secs_f64() * factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

/// Catalyst API client over HTTP
pub struct HttpClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    retry: RetryConfig,
}

impl HttpClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ClientError::InvalidConfig("API key is empty".to_string()));
        }
        if config.endpoint.is_empty() {
            return Err(ClientError::InvalidConfig("endpoint is empty".to_string()));
        }

        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            ClientError::InvalidConfig(format!("invalid endpoint {}: {}", config.endpoint, e))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "endpoint cannot be used as a base URL: {}",
                config.endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("catalyst-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
            retry: config.retry,
        })
    }

    /// Get the endpoint
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    fn url(&self, prefix: &[&str], segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(prefix).extend(segments);
        }
        url
    }

    fn runtime_url(&self, segments: &[&str]) -> Url {
        self.url(&RUNTIME_API, segments)
    }

    fn management_url(&self, segments: &[&str]) -> Url {
        self.url(&MANAGEMENT_API, segments)
    }

    /// Send a request, retrying transient failures
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        kind: &'static str,
        name: &str,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .bearer_auth(&self.api_key);
            if let Some(ref body) = body {
                request = request.json(body);
            }

            tracing::debug!("{} {}", method, url);

            let err = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let message = error_message(response).await;
                    ClientError::from_status(status, kind, name, message)
                }
                Err(e) => ClientError::Http(e),
            };

            if attempt >= self.retry.max_retries || !err.is_retryable() {
                return Err(err);
            }

            let delay = self.retry.delay_for_attempt(attempt);
            tracing::debug!("Retrying {} {} in {:?}: {}", method, url, delay, err);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

async fn error_message(response: reqwest::Response) -> String {
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string();
    let text = match response.text().await {
        Ok(text) if !text.trim().is_empty() => text,
        _ => return reason,
    };

    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(ApiErrorBody {
            message: Some(message),
            ..
        })
        | Ok(ApiErrorBody {
            error: Some(message),
            ..
        }) => message,
        _ => text,
    }
}

#[async_trait]
impl RegionApi for HttpClient {
    async fn create_region(&self, region: &Region) -> Result<String> {
        let name = region.name().unwrap_or_default().to_string();
        let url = self.runtime_url(&["regions"]);
        let body = serde_json::to_value(region)?;

        let response = self
            .execute(Method::POST, url, Some(body), "region", &name)
            .await?;
        let created: CreateRegionResponse = response.json().await?;

        match created.join_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ClientError::MissingJoinToken(name)),
        }
    }

    async fn get_region(&self, name: &str) -> Result<Region> {
        let url = self.runtime_url(&["regions", name]);
        let response = self.execute(Method::GET, url, None, "region", name).await?;
        Ok(response.json().await?)
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        #[derive(Deserialize)]
        struct RegionList {
            #[serde(default)]
            items: Vec<Region>,
        }

        let url = self.runtime_url(&["regions"]);
        let response = self.execute(Method::GET, url, None, "region", "").await?;
        let list: RegionList = response.json().await?;
        Ok(list.items)
    }

    async fn update_region(&self, region: &Region) -> Result<()> {
        let name = region
            .name()
            .ok_or(ClientError::MissingField("metadata.name"))?;
        let url = self.runtime_url(&["regions", name]);
        let body = serde_json::to_value(region)?;

        self.execute(Method::PUT, url, Some(body), "region", name)
            .await?;
        Ok(())
    }

    async fn delete_region(&self, name: &str) -> Result<()> {
        let url = self.runtime_url(&["regions", name]);
        self.execute(Method::DELETE, url, None, "region", name)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectApi for HttpClient {
    async fn create_project(&self, project: &Project) -> Result<()> {
        let name = project.name().unwrap_or_default().to_string();
        let url = self.runtime_url(&["projects"]);
        let body = serde_json::to_value(project)?;

        self.execute(Method::POST, url, Some(body), "project", &name)
            .await?;
        Ok(())
    }

    async fn get_project(&self, name: &str) -> Result<Project> {
        let url = self.runtime_url(&["projects", name]);
        let response = self
            .execute(Method::GET, url, None, "project", name)
            .await?;
        Ok(response.json().await?)
    }

    async fn update_project(&self, project: &Project) -> Result<()> {
        let name = project
            .name()
            .ok_or(ClientError::MissingField("metadata.name"))?;
        let url = self.runtime_url(&["projects", name]);
        let body = serde_json::to_value(project)?;

        self.execute(Method::PATCH, url, Some(body), "project", name)
            .await?;
        Ok(())
    }

    async fn delete_project(&self, name: &str) -> Result<()> {
        let url = self.runtime_url(&["projects", name]);
        self.execute(Method::DELETE, url, None, "project", name)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OrganizationApi for HttpClient {
    async fn get_current_user(&self) -> Result<User> {
        let url = self.management_url(&["users", "me"]);
        let response = self.execute(Method::GET, url, None, "user", "me").await?;
        Ok(response.json().await?)
    }

    async fn get_organization(&self, id: &str) -> Result<Organization> {
        let url = self.management_url(&["orgs", id]);
        let response = self
            .execute(Method::GET, url, None, "organization", id)
            .await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> HttpClient {
        HttpClient::new(ClientConfig::new(endpoint, "test-key")).unwrap()
    }

    #[test]
    fn test_runtime_url() {
        let c = client("https://api.example.com");
        assert_eq!(
            c.runtime_url(&["regions", "r1"]).as_str(),
            "https://api.example.com/apis/cra.diagrid.io/v1beta1/regions/r1"
        );
    }

    #[test]
    fn test_management_url_keeps_base_path() {
        let c = client("https://example.com/catalyst/");
        assert_eq!(
            c.management_url(&["users", "me"]).as_str(),
            "https://example.com/catalyst/api/v1/users/me"
        );
    }

    #[test]
    fn test_url_escapes_segments() {
        let c = client("https://api.example.com");
        let url = c.runtime_url(&["projects", "a/b"]);
        assert!(url.as_str().ends_with("/projects/a%2Fb"));
    }

    #[test]
    fn test_rejects_empty_credentials() {
        let err = HttpClient::new(ClientConfig::new("https://api.example.com", ""))
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::InvalidConfig(_)));

        let err = HttpClient::new(ClientConfig::new("", "key")).err().unwrap();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_non_base_endpoint() {
        let err = HttpClient::new(ClientConfig::new("mailto:ops@example.com", "key"))
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
            backoff_multiplier: 2.0,
        };

        assert_eq!(retry.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(retry.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(retry.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(retry.delay_for_attempt(3), Duration::from_secs(3));
    }

    #[test]
    fn test_retry_delay_overflow_falls_back_to_max() {
        let retry = RetryConfig {
            max_retries: 2000,
            ..Default::default()
        };

        assert_eq!(retry.delay_for_attempt(1100), retry.max_delay);
        assert_eq!(retry.delay_for_attempt(u32::MAX), retry.max_delay);
    }

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = ClientConfig::new("https://api.example.com", "super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
