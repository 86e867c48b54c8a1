//! Discord `OAuth2` client.
//!
//! Handles the authorization code exchange and resolves access tokens back
//! to Discord users. [`OAuthClient`] is the seam the routes use, so tests can
//! stand in for Discord.

use async_trait::async_trait;

use crate::{
    config::DiscordConfig,
    error::{Error, Result},
    models::{DiscordIdentity, TokenGrant},
};

/// Operations the dashboard needs from the `OAuth2` provider.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Exchange an authorization code for tokens.
    ///
    /// Returns [`Error::OAuthProvider`] with the provider's payload when the
    /// provider answers with an `error` field.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;

    /// Resolve an access token to its user. `Ok(None)` means the provider
    /// rejected the token.
    async fn identify(&self, access_token: &str) -> Result<Option<DiscordIdentity>>;
}

/// [`OAuthClient`] backed by the Discord REST API.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    config: DiscordConfig,
    http_client: reqwest::Client,
}

impl DiscordClient {
    /// Create a client with a default HTTP client.
    #[must_use]
    pub fn new(config: DiscordConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a client sharing an existing HTTP client.
    #[must_use]
    pub fn with_http_client(config: DiscordConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    async fn request_token(&self, code: &str) -> anyhow::Result<serde_json::Value> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
            ("scope", "identify"),
        ];

        let response = self
            .http_client
            .post(self.config.token_url())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&params)
            .send()
            .await?;

        // Discord reports exchange failures as a JSON body; the status alone
        // does not say what went wrong.
        Ok(response.json::<serde_json::Value>().await?)
    }
}

/// Interpret a token endpoint response body.
pub(crate) fn parse_token_response(body: serde_json::Value) -> Result<TokenGrant> {
    if body.get("error").is_some_and(|e| !e.is_null()) {
        return Err(Error::OAuthProvider(body));
    }

    serde_json::from_value(body)
        .map_err(|e| Error::DiscordApi(format!("unexpected token response: {e}")))
}

#[async_trait]
impl OAuthClient for DiscordClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let body = self.request_token(code).await.map_err(|e| {
            tracing::error!("Discord token exchange request failed: {}", e);
            Error::DiscordApi(e.to_string())
        })?;

        parse_token_response(body)
    }

    async fn identify(&self, access_token: &str) -> Result<Option<DiscordIdentity>> {
        let response = self
            .http_client
            .get(self.config.current_user_url())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::DiscordApi(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Discord user lookup failed: {} - {}", status, error_text);
            return Err(Error::DiscordApi(format!(
                "user lookup failed with status {status}"
            )));
        }

        let identity = response
            .json::<DiscordIdentity>()
            .await
            .map_err(|e| Error::DiscordApi(e.to_string()))?;

        Ok(Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_token_response_success() {
        let grant = parse_token_response(json!({
            "access_token": "6qrZcUqja7812RVdnEKjpzOL4CvHBFG",
            "token_type": "Bearer",
            "expires_in": 604800,
            "refresh_token": "D43f5y0ahjqew82jZ4NViEr2YafMKhue",
            "scope": "identify"
        }))
        .unwrap();

        assert_eq!(grant.access_token, "6qrZcUqja7812RVdnEKjpzOL4CvHBFG");
        assert_eq!(grant.expires_in, 604800);
    }

    #[test]
    fn test_parse_token_response_provider_error() {
        let payload = json!({
            "error": "invalid_grant",
            "error_description": "Invalid \"code\" in request."
        });

        match parse_token_response(payload.clone()) {
            Err(Error::OAuthProvider(body)) => assert_eq!(body, payload),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_token_response_malformed() {
        let result = parse_token_response(json!({"access_token": "only"}));
        assert!(matches!(result, Err(Error::DiscordApi(_))));
    }
}
