//! Credential provider: project id → calendar-scoped access token.
//!
//! Boundary lookup only, no caching. The bootstrap key (the identity the
//! process runs as) gets a cloud-platform token, reads the calendar
//! service-account key out of Secret Manager, and that key is exchanged for
//! the calendar-scoped token the rest of the run uses.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};
use crate::google::auth::{self, AccessToken, ServiceAccountKey, CALENDAR_SCOPE, CLOUD_PLATFORM_SCOPE};
use crate::google::secret::SecretManagerClient;

/// Exchanges a project identifier for a calendar-scoped access token.
#[derive(Debug)]
pub struct CredentialProvider {
    http_client: reqwest::Client,
    bootstrap: ServiceAccountKey,
    timeout: Duration,
}

impl CredentialProvider {
    /// Creates a provider around the given bootstrap key.
    pub fn new(bootstrap: ServiceAccountKey, timeout: Duration) -> Self {
        Self {
            http_client: auth::http_client(timeout),
            bootstrap,
            timeout,
        }
    }

    /// Obtains a calendar-scoped access token.
    ///
    /// When `secret_name` is `None` the project must hold exactly one
    /// secret; zero or several is an error rather than a blind first pick.
    pub async fn calendar_token(
        &self,
        project_id: &str,
        secret_name: Option<&str>,
    ) -> SyncResult<AccessToken> {
        let bootstrap_token =
            auth::fetch_access_token(&self.http_client, &self.bootstrap, CLOUD_PLATFORM_SCOPE)
                .await?;

        let secrets = SecretManagerClient::new(&bootstrap_token.token, self.timeout);

        let resource_name = match secret_name {
            Some(name) => format!("projects/{}/secrets/{}", project_id, name),
            None => {
                let names = secrets.list_secrets(project_id).await?;
                match names.as_slice() {
                    [single] => single.clone(),
                    [] => {
                        return Err(SyncError::credential(format!(
                            "no secrets found under project {}",
                            project_id
                        )));
                    }
                    several => {
                        return Err(SyncError::credential(format!(
                            "{} secrets under project {}; set SECRET_NAME to pick one",
                            several.len(),
                            project_id
                        )));
                    }
                }
            }
        };

        debug!(secret = %resource_name, "reading calendar service-account key");

        let payload = secrets.access_latest(&resource_name).await?;
        let payload = String::from_utf8(payload)
            .map_err(|e| SyncError::credential(format!("secret payload is not UTF-8: {}", e)))?;
        let calendar_key = ServiceAccountKey::from_json(&payload)?;

        let token =
            auth::fetch_access_token(&self.http_client, &calendar_key, CALENDAR_SCOPE).await?;

        info!(account = %calendar_key.client_email, "obtained calendar access token");
        Ok(token)
    }
}
