//! Secret Manager API client.
//!
//! Two operations: list the secrets under a project, and read the latest
//! version of one secret. Payloads come back base64-encoded.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::debug;

use crate::error::{SyncError, SyncResult};

use super::auth::http_client;

const SECRET_MANAGER_API_BASE: &str = "https://secretmanager.googleapis.com/v1";

/// Secret Manager API client.
#[derive(Debug)]
pub struct SecretManagerClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl SecretManagerClient {
    /// Creates a client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: http_client(timeout),
            access_token: access_token.into(),
        }
    }

    /// Lists the full resource names of all secrets under a project.
    pub async fn list_secrets(&self, project_id: &str) -> SyncResult<Vec<String>> {
        let url = format!("{}/projects/{}/secrets", SECRET_MANAGER_API_BASE, project_id);
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(&self.access_token);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let body = send_checked(request).await?;
            let page: ListSecretsResponse = serde_json::from_str(&body).map_err(|e| {
                SyncError::credential(format!("failed to parse secret listing: {}", e))
            })?;

            names.extend(page.secrets.into_iter().map(|s| s.name));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(project_id, count = names.len(), "listed secrets");
        Ok(names)
    }

    /// Reads and decodes the latest version of a secret.
    ///
    /// `secret_name` is the full resource name
    /// (`projects/{project}/secrets/{secret}`).
    pub async fn access_latest(&self, secret_name: &str) -> SyncResult<Vec<u8>> {
        let url = format!(
            "{}/{}/versions/latest:access",
            SECRET_MANAGER_API_BASE, secret_name
        );

        let body = send_checked(self.http_client.get(&url).bearer_auth(&self.access_token)).await?;

        let response: AccessResponse = serde_json::from_str(&body).map_err(|e| {
            SyncError::credential(format!("failed to parse secret version: {}", e))
        })?;

        BASE64
            .decode(response.payload.data.as_bytes())
            .map_err(|e| SyncError::credential(format!("secret payload is not valid base64: {}", e)))
    }
}

async fn send_checked(request: reqwest::RequestBuilder) -> SyncResult<String> {
    let response = request
        .send()
        .await
        .map_err(|e| SyncError::credential(format!("secret manager request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SyncError::credential(format!("failed to read secret manager response: {}", e)))?;

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(SyncError::credential("access token expired or invalid"));
    }
    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(SyncError::credential("access denied to secret manager"));
    }
    if !status.is_success() {
        return Err(SyncError::credential(format!(
            "secret manager error ({}): {}",
            status, body
        )));
    }

    Ok(body)
}

/// Response from the secrets.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSecretsResponse {
    #[serde(default)]
    secrets: Vec<ApiSecret>,
    next_page_token: Option<String>,
}

/// A single secret from the listing.
#[derive(Debug, Deserialize)]
struct ApiSecret {
    name: String,
}

/// Response from the versions.access endpoint.
#[derive(Debug, Deserialize)]
struct AccessResponse {
    payload: ApiPayload,
}

#[derive(Debug, Deserialize)]
struct ApiPayload {
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_secret_listing() {
        let json = r#"{
            "secrets": [
                {"name": "projects/my-project/secrets/calendar-key", "createTime": "2024-01-01T00:00:00Z"}
            ]
        }"#;

        let parsed: ListSecretsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.secrets.len(), 1);
        assert_eq!(
            parsed.secrets[0].name,
            "projects/my-project/secrets/calendar-key"
        );
        assert!(parsed.next_page_token.is_none());
    }

    #[test]
    fn parse_empty_listing() {
        let parsed: ListSecretsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.secrets.is_empty());
    }

    #[test]
    fn parse_access_response_and_decode() {
        let json = r#"{
            "name": "projects/my-project/secrets/calendar-key/versions/3",
            "payload": {"data": "eyJrZXkiOiAidmFsdWUifQ=="}
        }"#;

        let parsed: AccessResponse = serde_json::from_str(json).unwrap();
        let bytes = BASE64.decode(parsed.payload.data.as_bytes()).unwrap();
        assert_eq!(bytes, br#"{"key": "value"}"#);
    }
}
