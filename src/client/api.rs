//! REST client over [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use super::ClientError;
use crate::config::Config;
use crate::domain::{AllocationResponse, RoomRequest};

/// The allocation endpoints the workflow helpers drive.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AllocationApi: Send + Sync {
    async fn get_request(&self, request_id: Uuid) -> Result<RoomRequest, ClientError>;

    async fn approve(
        &self,
        request_id: Uuid,
        room_id: Uuid,
    ) -> Result<AllocationResponse, ClientError>;

    async fn cancel(&self, request_id: Uuid) -> Result<RoomRequest, ClientError>;
}

/// HTTP client for one API base URL, authenticated with a bearer token.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base URL must start with http:// or https://, got {base_url}"
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Client for `HOSTEL_API_URL` with the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.http_timeout_seconds),
        )
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        tracing::debug!(path, "GET");
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        Self::parse_response(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ClientError> {
        tracing::debug!(path, "POST");
        let response = self
            .authorize(self.client.post(self.url(path)))
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Decode a 2xx body, or turn anything else into [`ClientError::Api`].
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ClientError::from_response(status, &body);
            tracing::warn!(status = status.as_u16(), error = %err, "API call failed");
            return Err(err);
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl AllocationApi for ApiClient {
    async fn get_request(&self, request_id: Uuid) -> Result<RoomRequest, ClientError> {
        self.get_json(&format!("/api/room-allocation/requests/{request_id}"))
            .await
    }

    async fn approve(
        &self,
        request_id: Uuid,
        room_id: Uuid,
    ) -> Result<AllocationResponse, ClientError> {
        self.post_json(
            &format!("/api/room-allocation/requests/{request_id}/approve"),
            json!({ "room_id": room_id }),
        )
        .await
    }

    async fn cancel(&self, request_id: Uuid) -> Result<RoomRequest, ClientError> {
        self.post_json(
            &format!("/api/room-allocation/requests/{request_id}/cancel"),
            json!({}),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let client = ApiClient::new("http://localhost:3002/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3002");
        assert_eq!(
            client.url("/api/room-allocation/requests"),
            "http://localhost:3002/api/room-allocation/requests"
        );
    }

    #[test]
    fn test_rejects_base_url_without_scheme() {
        assert!(matches!(
            ApiClient::new("localhost:3002", Duration::from_secs(5)),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_default_config_points_at_local_server() {
        let client = ApiClient::from_config(&Config::for_secret("x".repeat(32))).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3002");
    }
}
