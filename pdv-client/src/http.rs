//! HTTP client for the pdv-cloud API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::error::{ErrorBody, ErrorCode};
use shared::session::{LoginRequest, SessionResponse, SignupRequest};
use shared::{SnapshotPatch, TenantSnapshot};

use crate::sync::SnapshotRemote;
use crate::{ClientError, ClientResult, SyncConfig};

/// HTTP client for making requests to pdv-cloud
#[derive(Debug, Clone)]
pub struct CloudClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl CloudClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &SyncConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorize(self.client.get(self.url(path)));
        let response = request.send().await.map_err(ClientError::from_transport)?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        let response = request.send().await.map_err(ClientError::from_transport)?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.map_err(ClientError::from_transport)?;
            if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
                return Err(ClientError::Rejected {
                    status: status.as_u16(),
                    code: body.error_code(),
                    message: body.error,
                    reason: body.reason,
                });
            }
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Rejected {
                    status: status.as_u16(),
                    code: ErrorCode::Unknown,
                    message: text,
                    reason: None,
                }),
            };
        }

        let bytes = response.bytes().await.map_err(ClientError::from_transport)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // ========== Auth API ==========

    /// Login with login key and password
    pub async fn login(&self, login_key: &str, password: &str) -> ClientResult<SessionResponse> {
        let request = LoginRequest {
            login_key: login_key.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &request).await
    }

    /// Register a new shop; it starts in trial
    pub async fn signup(
        &self,
        login_key: &str,
        shop_name: &str,
        password: &str,
    ) -> ClientResult<SessionResponse> {
        let request = SignupRequest {
            login_key: login_key.to_string(),
            shop_name: shop_name.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/signup", &request).await
    }

    // ========== Sync API ==========

    pub async fn fetch_snapshot(&self, tenant_id: &str) -> ClientResult<TenantSnapshot> {
        self.get(&format!("/tenant/{tenant_id}")).await
    }

    pub async fn push_snapshot(&self, tenant_id: &str, patch: &SnapshotPatch) -> ClientResult<()> {
        let _: serde_json::Value = self.post(&format!("/tenant/{tenant_id}"), patch).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotRemote for CloudClient {
    async fn fetch(&self, tenant_id: &str) -> ClientResult<TenantSnapshot> {
        self.fetch_snapshot(tenant_id).await
    }

    async fn push(&self, tenant_id: &str, patch: &SnapshotPatch) -> ClientResult<()> {
        self.push_snapshot(tenant_id, patch).await
    }
}
