//! Statsdash
//!
//! Discord login and the data loaders behind the per-user statistics
//! dashboard.
//!
//! # Features
//!
//! - `sqlx-storage` (default): PostgreSQL storage via SQLx
//! - `memory-storage` (default): In-memory storage for tests and local runs
//!
//! # Example
//!
//! ```rust,ignore
//! use statsdash::{AppState, Config, SqlxStorage};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     dotenvy::dotenv().ok();
//!     let config = Config::from_env()?;
//!     let pool = sqlx::PgPool::connect(&std::env::var("DATABASE_URL")?).await?;
//!     let storage = SqlxStorage::new(pool);
//!     storage.migrate().await?;
//!
//!     let state = Arc::new(AppState::new(config, storage));
//!     let app = statsdash::app(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod deferred;
pub mod discord;
pub mod error;
pub mod models;
pub mod routes;
pub mod site_api;
pub mod storage;

// Re-exports for convenience
use std::sync::Arc;

pub use config::{Config, ConfigError, DiscordConfig, ServerConfig, SessionConfig, SiteConfig};
pub use discord::{DiscordClient, OAuthClient};
pub use error::{Error, Result, StorageError};
pub use models::Session;
pub use site_api::{HttpSiteApi, SiteApi};
#[cfg(feature = "memory-storage")]
pub use storage::MemoryStorage;
#[cfg(feature = "sqlx-storage")]
pub use storage::SqlxStorage;
pub use storage::{StatsStorage, Storage};

/// Application state containing configuration, storage and upstream clients.
///
/// This is designed to be wrapped in `Arc` and used with Axum's state extractor.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Storage backend for user statistics.
    pub storage: Box<dyn Storage>,
    /// Discord `OAuth2` client.
    pub oauth: Box<dyn OAuthClient>,
    /// Site user API and item catalogue client.
    pub site: Box<dyn SiteApi>,
}

impl AppState {
    /// Create a new AppState with the given configuration and storage.
    pub fn new(config: Config, storage: impl Storage + 'static) -> Self {
        Self::with_http_client(config, storage, reqwest::Client::new())
    }

    /// Create a new AppState with a custom HTTP client shared by all upstream calls.
    pub fn with_http_client(
        config: Config,
        storage: impl Storage + 'static,
        http_client: reqwest::Client,
    ) -> Self {
        let oauth = DiscordClient::with_http_client(config.discord.clone(), http_client.clone());
        let site = HttpSiteApi::new(config.site.clone(), http_client);
        Self::with_clients(config, storage, oauth, site)
    }

    /// Create a new AppState with explicit upstream clients.
    pub fn with_clients(
        config: Config,
        storage: impl Storage + 'static,
        oauth: impl OAuthClient + 'static,
        site: impl SiteApi + 'static,
    ) -> Self {
        Self {
            config,
            storage: Box::new(storage),
            oauth: Box::new(oauth),
            site: Box::new(site),
        }
    }
}

/// Type alias for Arc-wrapped AppState, commonly used with Axum.
pub type SharedState = Arc<AppState>;

/// Build the full application router.
pub fn app(state: SharedState) -> axum::Router {
    routes::router()
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
