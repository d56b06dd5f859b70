//! Google Cloud Secret Manager client (REST v1)
//!
//! Talks to `secretmanager.googleapis.com` directly over HTTPS. Payloads
//! travel base64 encoded in both directions.
//!
//! Credentials are not acquired here: the caller passes a ready OAuth2
//! access token (for example `gcloud auth print-access-token`), usually via
//! `GOOGLE_OAUTH_ACCESS_TOKEN`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::traits::{RemoteError, RemoteResult, SecretManagerClient};
use crate::config::GcpSettings;

/// Public Secret Manager endpoint
pub const DEFAULT_ENDPOINT: &str = "https://secretmanager.googleapis.com/v1";

/// REST client for Secret Manager
#[derive(Debug, Clone)]
pub struct GcpSecretManager {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct AccessResponse {
    payload: Payload,
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    data: String,
}

#[derive(Deserialize)]
struct SecretResource {
    name: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GcpSecretManager {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    pub fn from_settings(settings: &GcpSettings) -> Self {
        let client = Self::new(settings.endpoint.clone());
        match &settings.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        }
    }

    /// Attach an OAuth2 bearer token to every request
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turn non-success responses into typed errors
    async fn check(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        crate::debug_log!("Secret Manager returned {}: {}", status, message);

        Err(match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            StatusCode::CONFLICT => RemoteError::AlreadyExists(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::PermissionDenied(message),
            other => RemoteError::api(other.as_u16(), message),
        })
    }
}

#[async_trait]
impl SecretManagerClient for GcpSecretManager {
    fn name(&self) -> &str {
        "gcp"
    }

    async fn access_secret(&self, version: &str) -> RemoteResult<String> {
        crate::debug_log!("Downloading secret {}", version);

        let request = self.http.get(self.url(&format!("{}:access", version)));
        let response = Self::check(self.authorize(request).send().await?).await?;
        let body: AccessResponse = response.json().await?;

        let bytes = BASE64
            .decode(body.payload.data.as_bytes())
            .map_err(|e| RemoteError::InvalidPayload(format!("{}: {}", version, e)))?;
        String::from_utf8(bytes)
            .map_err(|_| RemoteError::InvalidPayload(format!("{}: payload is not UTF-8", version)))
    }

    async fn create_secret(&self, project: &str, secret_id: &str) -> RemoteResult<String> {
        crate::debug_log!("Creating secret {} in project {}", secret_id, project);

        let request = self
            .http
            .post(self.url(&format!("projects/{}/secrets", project)))
            .query(&[("secretId", secret_id)])
            .json(&json!({ "replication": { "automatic": {} } }));
        let response = Self::check(self.authorize(request).send().await?).await?;
        let secret: SecretResource = response.json().await?;
        Ok(secret.name)
    }

    async fn add_secret_version(&self, secret: &str, wire: &str) -> RemoteResult<()> {
        crate::debug_log!("Adding version to secret {}", secret);

        let request = self
            .http
            .post(self.url(&format!("{}:addVersion", secret)))
            .json(&json!({ "payload": { "data": BASE64.encode(wire.as_bytes()) } }));
        Self::check(self.authorize(request).send().await?).await?;
        Ok(())
    }
}
