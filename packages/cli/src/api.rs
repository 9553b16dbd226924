//! Management API Client
//!
//! Types for the remote update lifecycle and the HTTP client used to push
//! code updates and read function state back.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use crate::config::Config;

/// Remote update lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastUpdateStatus {
    InProgress,
    Successful,
    Failed,
    Unknown,
}

impl LastUpdateStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "InProgress" => LastUpdateStatus::InProgress,
            "Successful" => LastUpdateStatus::Successful,
            "Failed" => LastUpdateStatus::Failed,
            _ => LastUpdateStatus::Unknown,
        }
    }

    /// Anything other than `InProgress` means the update has settled.
    pub fn is_terminal(self) -> bool {
        self != LastUpdateStatus::InProgress
    }
}

impl std::fmt::Display for LastUpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LastUpdateStatus::InProgress => write!(f, "InProgress"),
            LastUpdateStatus::Successful => write!(f, "Successful"),
            LastUpdateStatus::Failed => write!(f, "Failed"),
            LastUpdateStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One observation of a function's update state. Re-fetched each poll,
/// never cached.
#[derive(Debug, Clone)]
pub struct UpdateStatus {
    pub state: LastUpdateStatus,
    pub reason: Option<String>,
}

/// Function-management operations the deploy client consumes.
#[async_trait]
pub trait FunctionApi: Send + Sync {
    /// Submit `archive` as a direct code update. The response carries the
    /// first observed update state.
    async fn update_function_code(
        &self,
        function_name: &str,
        archive: Vec<u8>,
    ) -> Result<UpdateStatus>;

    /// Fetch the function's current configuration to read its latest
    /// update state.
    async fn get_function(&self, function_name: &str) -> Result<UpdateStatus>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionConfiguration {
    #[serde(default)]
    last_update_status: Option<String>,
    #[serde(default)]
    last_update_status_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetFunctionResponse {
    configuration: FunctionConfiguration,
}

impl From<FunctionConfiguration> for UpdateStatus {
    fn from(config: FunctionConfiguration) -> Self {
        Self {
            state: config
                .last_update_status
                .as_deref()
                .map_or(LastUpdateStatus::Unknown, LastUpdateStatus::parse),
            reason: config.last_update_status_reason,
        }
    }
}

pub struct LambdaClient {
    client: reqwest::Client,
    base_url: String,
}

impl LambdaClient {
    /// Create from the default endpoint/credential resolution chain.
    pub fn from_config() -> Result<Self> {
        let config = Config::resolve()?;
        let base_url = config.endpoint();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl FunctionApi for LambdaClient {
    async fn update_function_code(
        &self,
        function_name: &str,
        archive: Vec<u8>,
    ) -> Result<UpdateStatus> {
        let url = format!(
            "{}/2015-03-31/functions/{}/code",
            self.base_url, function_name
        );
        let body = serde_json::json!({ "ZipFile": STANDARD.encode(&archive) });

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!(
                "code update for {} rejected with {}: {}",
                function_name,
                status,
                text
            );
        }

        let config: FunctionConfiguration = response.json().await?;
        Ok(config.into())
    }

    async fn get_function(&self, function_name: &str) -> Result<UpdateStatus> {
        let url = format!("{}/2015-03-31/functions/{}", self.base_url, function_name);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!(
                "fetching function {} failed with {}: {}",
                function_name,
                status,
                text
            );
        }

        let body: GetFunctionResponse = response.json().await?;
        Ok(body.configuration.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_status_strings_parse() {
        assert_eq!(
            LastUpdateStatus::parse("InProgress"),
            LastUpdateStatus::InProgress
        );
        assert_eq!(
            LastUpdateStatus::parse("Successful"),
            LastUpdateStatus::Successful
        );
        assert_eq!(LastUpdateStatus::parse("Failed"), LastUpdateStatus::Failed);
    }

    #[test]
    fn unrecognized_status_is_terminal() {
        let state = LastUpdateStatus::parse("SomethingNew");
        assert_eq!(state, LastUpdateStatus::Unknown);
        assert!(state.is_terminal());
        assert!(!LastUpdateStatus::InProgress.is_terminal());
    }

    #[test]
    fn function_configuration_deserializes_from_pascal_case() {
        let json = r#"{
            "LastUpdateStatus": "InProgress",
            "LastUpdateStatusReason": "Creating new deployment"
        }"#;
        let config: FunctionConfiguration = serde_json::from_str(json).unwrap();
        let status = UpdateStatus::from(config);
        assert_eq!(status.state, LastUpdateStatus::InProgress);
        assert_eq!(status.reason.as_deref(), Some("Creating new deployment"));
    }

    #[test]
    fn missing_status_fields_map_to_unknown() {
        let json = r#"{"Configuration": {}}"#;
        let body: GetFunctionResponse = serde_json::from_str(json).unwrap();
        let status = UpdateStatus::from(body.configuration);
        assert_eq!(status.state, LastUpdateStatus::Unknown);
        assert!(status.reason.is_none());
    }
}
