//! LinkedIn REST client.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{LinkedinError, ShareRequest};

/// Configuration for the LinkedIn client.
#[derive(Debug, Clone)]
pub struct LinkedinConfig {
    /// REST API base, e.g. `https://api.linkedin.com`.
    pub api_base: String,
    /// OAuth base, e.g. `https://www.linkedin.com`.
    pub oauth_base: String,
    pub client_id: String,
    pub client_secret: String,
}

impl LinkedinConfig {
    /// Production endpoints with the given application credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            api_base: "https://api.linkedin.com".to_string(),
            oauth_base: "https://www.linkedin.com".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// Token endpoint response.
///
/// `refresh_token` is only present when LinkedIn rotates it; callers keep
/// the previous one otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until the new access token expires.
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Client for the LinkedIn REST API. Built once per process; connection
/// pooling comes from the shared inner client.
pub struct LinkedinClient {
    http: Client,
    config: LinkedinConfig,
}

impl LinkedinClient {
    pub fn new(config: LinkedinConfig) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self { http, config }
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, LinkedinError> {
        let url = format!("{}/oauth/v2/accessToken", self.config.oauth_base);
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];

        let response = self.http.post(&url).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error body: {}", e));
            return Err(LinkedinError::Auth(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| LinkedinError::Auth(format!("malformed token response: {}", e)))?;
        debug!(
            expires_in = token.expires_in,
            rotated = token.refresh_token.is_some(),
            "exchanged refresh token"
        );
        Ok(token)
    }

    /// Publish a share. Returns the platform-assigned post id.
    ///
    /// Non-2xx responses surface the platform's error body verbatim in
    /// [`LinkedinError::Api`] so callers can log and persist it.
    pub async fn create_share(
        &self,
        access_token: &str,
        share: &ShareRequest,
    ) -> Result<String, LinkedinError> {
        let url = format!("{}/v2/ugcPosts", self.config.api_base);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(share)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error body: {}", e));
            return Err(LinkedinError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // The id comes back in the x-restli-id header; newer API versions
        // also echo it in the body.
        if let Some(id) = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
        {
            let id = id.to_string();
            info!(platform_post_id = %id, "created share");
            return Ok(id);
        }

        #[derive(Deserialize)]
        struct CreateShareResponse {
            id: String,
        }

        let parsed: CreateShareResponse = response.json().await.map_err(|_| {
            LinkedinError::InvalidResponse("share response carried no post id".to_string())
        })?;
        info!(platform_post_id = %parsed.id, "created share");
        Ok(parsed.id)
    }
}
