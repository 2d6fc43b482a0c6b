use super::error::{SyncError, SyncResult};
use crate::config::TOKEN_EXPIRY_MARGIN;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Dropbox app credentials. Only the refresh token is long-lived; it is
/// exchanged for an access token on first use and never written to disk.
#[derive(Debug)]
pub struct Credentials {
    pub app_key: String,
    pub app_secret: SecretString,
    pub refresh_token: SecretString,
}

impl Credentials {
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: SecretString::new(app_secret.into()),
            refresh_token: SecretString::new(refresh_token.into()),
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.app_key.trim().is_empty() {
            return Err(SyncError::config("APP_KEY is required"));
        }
        if self.app_secret.expose_secret().trim().is_empty() {
            return Err(SyncError::config("APP_SECRET is required"));
        }
        if self.refresh_token.expose_secret().trim().is_empty() {
            return Err(SyncError::config("REFRESH_TOKEN is required"));
        }
        Ok(())
    }
}

/// OAuth token response
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

struct CachedToken {
    value: SecretString,
    refresh_after: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.refresh_after.map_or(true, |deadline| now < deadline)
    }
}

/// Exchanges the refresh token for short-lived access tokens.
pub struct OAuthClient {
    credentials: Credentials,
    token_url: String,
    http_client: reqwest::Client,
    cached: Option<CachedToken>,
}

impl OAuthClient {
    pub fn new(credentials: Credentials, token_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            http_client,
            cached: None,
        }
    }

    /// Get an access token, refreshing it when the cached one is about to expire
    pub async fn access_token(&mut self) -> SyncResult<String> {
        if let Some(cached) = &self.cached {
            if cached.is_fresh(Instant::now()) {
                return Ok(cached.value.expose_secret().clone());
            }
            debug!("Cached access token expired");
        }

        let response = self.refresh_access_token().await?;
        Ok(response.access_token)
    }

    /// Refresh access token
    pub async fn refresh_access_token(&mut self) -> SyncResult<OAuthTokenResponse> {
        info!("Refreshing Dropbox access token...");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.credentials.refresh_token.expose_secret().as_str()),
            ("client_id", self.credentials.app_key.as_str()),
            ("client_secret", self.credentials.app_secret.expose_secret().as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(SyncError::http)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SyncError::token_refresh(format!(
                "Status Code {}, Response: {}",
                status.as_u16(),
                error_text
            )));
        }

        let token_response: OAuthTokenResponse = response.json().await.map_err(SyncError::http)?;

        let refresh_after = token_response.expires_in.map(|secs| {
            Instant::now() + Duration::from_secs(secs).saturating_sub(TOKEN_EXPIRY_MARGIN)
        });
        self.cached = Some(CachedToken {
            value: SecretString::new(token_response.access_token.clone()),
            refresh_after,
        });

        debug!(
            "Access token refreshed (expires_in: {:?})",
            token_response.expires_in
        );
        Ok(token_response)
    }

}
