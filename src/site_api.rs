//! Client for the site's own user API and item catalogue.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    config::SiteConfig,
    error::{Error, Result},
    models::{BaseUserData, Items, UserData},
};

/// Data the dashboard loaders fetch over HTTP.
#[async_trait]
pub trait SiteApi: Send + Sync {
    /// The item catalogue.
    async fn items(&self) -> Result<Items>;

    /// Cheap base profile for a user (`/api/user/{id}/base`).
    async fn base_user(&self, user_id: &str) -> Result<BaseUserData>;

    /// Full profile for a user (`/api/user/{id}`).
    async fn user(&self, user_id: &str) -> Result<UserData>;
}

/// [`SiteApi`] over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpSiteApi {
    config: SiteConfig,
    http_client: reqwest::Client,
}

impl HttpSiteApi {
    #[must_use]
    pub fn new(config: SiteConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn user_url(&self, user_id: &str) -> String {
        format!(
            "{}/api/user/{}",
            self.config.api_url.trim_end_matches('/'),
            urlencoding::encode(user_id)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::SiteApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%url, %status, "site API request failed");
            return Err(Error::SiteApi(format!("GET {url} returned {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::SiteApi(e.to_string()))
    }
}

#[async_trait]
impl SiteApi for HttpSiteApi {
    async fn items(&self) -> Result<Items> {
        self.get_json(&self.config.items_url).await
    }

    async fn base_user(&self, user_id: &str) -> Result<BaseUserData> {
        self.get_json(&format!("{}/base", self.user_url(user_id)))
            .await
    }

    async fn user(&self, user_id: &str) -> Result<UserData> {
        self.get_json(&self.user_url(user_id)).await
    }
}
