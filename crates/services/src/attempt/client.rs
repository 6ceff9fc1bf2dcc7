use std::env;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use attempt_core::model::{AssessmentId, AttemptId};

use crate::attempt::wire::{RestartRequestBody, RestartResponse};
use crate::error::RestartClientError;

/// Path of the restart endpoint under the configured base URL.
const RESTART_PATH: &str = "assessment/restart";

#[derive(Clone, Debug)]
pub struct RestartEndpointConfig {
    pub base_url: Url,
    pub auth_token: Option<String>,
}

impl RestartEndpointConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("ATTEMPT_API_BASE_URL").ok()?;
        let base_url = Url::parse(base_url.trim()).ok()?;
        let auth_token = env::var("ATTEMPT_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Some(Self {
            base_url,
            auth_token,
        })
    }
}

/// The seam the recovery workflow depends on; tests substitute their own
/// implementation.
#[async_trait]
pub trait RestartApi: Send + Sync {
    /// Issue one restart call for the given attempt, carrying the formatted
    /// snapshot body.
    ///
    /// # Errors
    ///
    /// Returns `RestartClientError` for transport failures, non-success
    /// statuses, empty bodies, and undecodable replies.
    async fn restart_attempt(
        &self,
        assessment_id: &AssessmentId,
        attempt_id: &AttemptId,
        body: &RestartRequestBody,
    ) -> Result<RestartResponse, RestartClientError>;
}

/// HTTP client for the restart endpoint. Sends exactly one request per call;
/// nothing is retried.
#[derive(Clone)]
pub struct RestartClient {
    client: Client,
    config: RestartEndpointConfig,
}

impl RestartClient {
    #[must_use]
    pub fn new(config: RestartEndpointConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build a client from `ATTEMPT_API_BASE_URL` / `ATTEMPT_API_TOKEN`, if
    /// configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        RestartEndpointConfig::from_env().map(Self::new)
    }
}

#[async_trait]
impl RestartApi for RestartClient {
    async fn restart_attempt(
        &self,
        assessment_id: &AssessmentId,
        attempt_id: &AttemptId,
        body: &RestartRequestBody,
    ) -> Result<RestartResponse, RestartClientError> {
        let url = self.config.base_url.join(RESTART_PATH)?;

        let mut request = self
            .client
            .post(url)
            .query(&[
                ("assessmentId", assessment_id.as_str()),
                ("attemptId", attempt_id.as_str()),
            ])
            .json(body);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(RestartClientError::HttpStatus(response.status()));
        }

        // A success status with nothing in the body is still a failed
        // restart; it must not reach the store.
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(RestartClientError::EmptyResponse);
        }
        serde_json::from_str(&text).map_err(RestartClientError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RestartClient>();
    }

    #[test]
    fn test_restart_path_joins_under_base_url() {
        let config = RestartEndpointConfig {
            base_url: Url::parse("https://api.example.test/v1/").unwrap(),
            auth_token: None,
        };
        let joined = config.base_url.join(RESTART_PATH).unwrap();
        assert_eq!(joined.as_str(), "https://api.example.test/v1/assessment/restart");
    }
}
