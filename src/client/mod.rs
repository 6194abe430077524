pub mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use tracing::{debug, warn};

use crate::config::{env_lookup, parse_or, string_or};
use crate::error::{ConfigError, NetworkFailure};
use crate::models::{Course, CourseFields};

pub const DEFAULT_API_URL: &str = "http://localhost:8001/api/v1/courses";
pub const DEFAULT_ROUTE_SUFFIX: &str = "-course";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Path segments under the base resource endpoint. Each verb carries the
/// deployment's suffix, so `list` becomes `list-course` by default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePaths {
    suffix: String,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_SUFFIX)
    }
}

impl ResourcePaths {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Bare `list`, `add`, `update`, `delete` segments.
    pub fn plain() -> Self {
        Self::new("")
    }

    pub fn list(&self) -> String {
        format!("list{}", self.suffix)
    }

    pub fn add(&self) -> String {
        format!("add{}", self.suffix)
    }

    pub fn update(&self) -> String {
        format!("update{}", self.suffix)
    }

    pub fn delete(&self) -> String {
        format!("delete{}", self.suffix)
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub paths: ResourcePaths,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, paths: ResourcePaths) -> Result<Self, ConfigError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ConfigError::invalid("COURSE_API_URL", e))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::invalid(
                "COURSE_API_URL",
                "must be a hierarchical http(s) url",
            ));
        }
        Ok(Self {
            base_url,
            paths,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn new_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = string_or(&lookup, "COURSE_API_URL", DEFAULT_API_URL);
        let suffix = string_or(&lookup, "COURSE_ROUTE_SUFFIX", DEFAULT_ROUTE_SUFFIX);
        let timeout_secs = parse_or(&lookup, "COURSE_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        let mut config = Self::new(&base_url, ResourcePaths::new(suffix))?;
        config.timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }
}

/// The four exchanges against the course resource. Each is one request and
/// one response; failures are reported once and never retried.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list(&self) -> Result<Vec<Course>, NetworkFailure>;
    async fn create(&self, fields: &CourseFields) -> Result<(), NetworkFailure>;
    async fn update(&self, id: &str, fields: &CourseFields) -> Result<(), NetworkFailure>;
    async fn delete(&self, id: &str) -> Result<(), NetworkFailure>;
}

pub struct HttpResourceClient {
    client: Client,
    config: ClientConfig,
}

impl HttpResourceClient {
    pub fn new(config: ClientConfig) -> Result<Self, NetworkFailure> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.config.base_url.clone();
        // ClientConfig::new rejects cannot-be-a-base urls, so this always applies.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn check(response: Response) -> Result<Response, NetworkFailure> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!("course api answered {}: {}", status, body);
        Err(NetworkFailure::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn list(&self) -> Result<Vec<Course>, NetworkFailure> {
        let url = self.endpoint(&[&self.config.paths.list()]);
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let body_text = Self::check(response).await?.text().await?;

        serde_json::from_str::<dto::ListResponse>(&body_text)
            .map(|parsed| parsed.data)
            .map_err(|e| {
                tracing::error!("Failed to parse course list: {}", e);
                NetworkFailure::Decode(e.to_string())
            })
    }

    async fn create(&self, fields: &CourseFields) -> Result<(), NetworkFailure> {
        let url = self.endpoint(&[&self.config.paths.add()]);
        debug!("POST {}", url);

        let response = self.client.post(url).json(fields).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, id: &str, fields: &CourseFields) -> Result<(), NetworkFailure> {
        let url = self.endpoint(&[&self.config.paths.update(), id]);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(url)
            .json(&dto::UpdateRequest::new(id, fields))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), NetworkFailure> {
        let url = self.endpoint(&[&self.config.paths.delete(), id]);
        debug!("DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
