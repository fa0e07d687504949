//! OTP GraphQL HTTP client.
//!
//! Posts plan and service time range queries to an OpenTripPlanner
//! GraphQL endpoint. Handles authentication, concurrency limiting,
//! and conversion to domain types.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;

use crate::domain::{Plan, ServiceTimeRange};
use crate::params::{PlanParams, PlanVariant};

use super::PlanFetcher;
use super::convert::convert_plan;
use super::error::OtpError;
use super::queries::{PLAN_QUERY, SERVICE_TIME_RANGE_QUERY};
use super::types::{GraphQlResponse, PlanData, PlanVariables, ServiceTimeRangeData};

/// Default GraphQL endpoint.
const DEFAULT_BASE_URL: &str = "https://api.digitransit.fi/routing/v1/routers/hsl/index/graphql";

/// Default maximum concurrent requests. A summary search fans out to
/// up to seven plan variants at once, so this stays above that.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Subscription key header used by hosted endpoints.
const API_KEY_HEADER: &str = "digitransit-subscription-key";

/// Configuration for the OTP client.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// GraphQL endpoint URL
    pub base_url: String,
    /// Subscription key, if the endpoint requires one
    pub api_key: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Minutes east of UTC for the endpoint's local date and time
    pub utc_offset_minutes: i32,
}

impl OtpConfig {
    /// Create a config with production defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            utc_offset_minutes: 0,
        }
    }

    /// Set a custom endpoint URL (for testing or self-hosted OTP).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the subscription key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the endpoint's UTC offset in minutes.
    pub fn with_utc_offset(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

/// OTP GraphQL client.
///
/// Uses a semaphore to limit concurrent requests so a summary fan-out
/// does not trip the endpoint's rate limits.
#[derive(Debug, Clone)]
pub struct OtpClient {
    http: reqwest::Client,
    base_url: String,
    utc_offset_minutes: i32,
    semaphore: Arc<Semaphore>,
}

impl OtpClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OtpConfig) -> Result<Self, OtpError> {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(key) = &config.api_key {
            let value =
                reqwest::header::HeaderValue::from_str(key).map_err(|_| OtpError::Api {
                    status: 0,
                    message: "Invalid API key format".to_string(),
                })?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            utc_offset_minutes: config.utc_offset_minutes,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// POST a GraphQL document and unwrap the response envelope.
    async fn execute<T, V>(&self, query: &str, variables: V) -> Result<T, OtpError>
    where
        T: serde::de::DeserializeOwned,
        V: Serialize,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| OtpError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = self
            .http
            .post(&self.base_url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(OtpError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OtpError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OtpError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let envelope: GraphQlResponse<T> =
            serde_json::from_str(&body).map_err(|e| OtpError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        if let Some(errors) = envelope.errors {
            if !errors.is_empty() {
                let message = errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(OtpError::GraphQl { message });
            }
        }

        envelope.data.ok_or_else(|| OtpError::GraphQl {
            message: "response missing data".to_string(),
        })
    }
}

impl PlanFetcher for OtpClient {
    async fn fetch_plan(
        &self,
        variant: PlanVariant,
        params: &PlanParams,
    ) -> Result<Plan, OtpError> {
        let variables = PlanVariables::build(params, variant, self.utc_offset_minutes);
        let data: PlanData = self.execute(PLAN_QUERY, &variables).await?;
        Ok(convert_plan(data.plan))
    }

    async fn fetch_service_time_range(&self) -> Result<ServiceTimeRange, OtpError> {
        let data: ServiceTimeRangeData = self
            .execute(SERVICE_TIME_RANGE_QUERY, serde_json::Map::new())
            .await?;

        ServiceTimeRange::new(data.service_time_range.start, data.service_time_range.end)
            .map_err(|e| OtpError::Json {
                message: e.to_string(),
                body: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = OtpConfig::new()
            .with_base_url("http://localhost:9080/otp")
            .with_api_key("test-key")
            .with_max_concurrent(4)
            .with_timeout(10)
            .with_utc_offset(180);

        assert_eq!(config.base_url, "http://localhost:9080/otp");
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.utc_offset_minutes, 180);
    }

    #[test]
    fn config_defaults() {
        let config = OtpConfig::new();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation() {
        let client = OtpClient::new(OtpConfig::new());
        assert!(client.is_ok());

        let with_key = OtpClient::new(OtpConfig::new().with_api_key("abc123"));
        assert!(with_key.is_ok());
    }

    // Request tests run against the mock client; real HTTP tests
    // would need a live endpoint and belong behind #[ignore].
}
