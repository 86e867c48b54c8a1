//! Configuration types for the stats dashboard service.

use serde::Deserialize;

/// Root configuration for the dashboard service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord `OAuth2` configuration.
    pub discord: DiscordConfig,
    /// Site API endpoints used by the loaders.
    pub site: SiteConfig,
    /// Session cookie settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Discord `OAuth2` and API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Discord application client ID.
    pub client_id: String,
    /// Discord application client secret.
    pub client_secret: String,
    /// `OAuth2` redirect URI registered with Discord (points back at `/login`).
    pub redirect_uri: String,
    /// Public authorization URL users are sent to when starting a login.
    pub oauth_url: String,
    /// Base URL of the Discord REST API.
    #[serde(default = "default_discord_api_url")]
    pub api_url: String,
}

impl DiscordConfig {
    /// Token endpoint used for the authorization code exchange.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.api_url.trim_end_matches('/'))
    }

    /// Endpoint returning the user owning an access token.
    #[must_use]
    pub fn current_user_url(&self) -> String {
        format!("{}/users/@me", self.api_url.trim_end_matches('/'))
    }
}

/// Locations of the site's own user API and item catalogue.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL serving `/api/user/{id}` and `/api/user/{id}/base`.
    pub api_url: String,
    /// URL of the item catalogue document.
    pub items_url: String,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Whether session cookies carry the `Secure` attribute.
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_secure: default_cookie_secure(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_discord_api_url() -> String {
    "https://discord.com/api".to_string()
}

fn default_site_api_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_cookie_secure() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Expected environment variables:
    /// - `DISCORD_OAUTH_CLIENTID`
    /// - `DISCORD_OAUTH_SECRET`
    /// - `DISCORD_OAUTH_REDIRECT`
    /// - `PUBLIC_OAUTH_URL`
    /// - `DISCORD_API_URL` (optional, defaults to "https://discord.com/api")
    /// - `SITE_API_URL` (optional, defaults to "http://localhost:5173")
    /// - `ITEMS_URL` (optional, defaults to "{SITE_API_URL}/api/items")
    /// - `COOKIE_SECURE` (optional, defaults to true)
    /// - `HOST` (optional, defaults to "0.0.0.0")
    /// - `PORT` (optional, defaults to 3000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let discord = DiscordConfig {
            client_id: required("DISCORD_OAUTH_CLIENTID")?,
            client_secret: required("DISCORD_OAUTH_SECRET")?,
            redirect_uri: required("DISCORD_OAUTH_REDIRECT")?,
            oauth_url: required("PUBLIC_OAUTH_URL")?,
            api_url: std::env::var("DISCORD_API_URL").unwrap_or_else(|_| default_discord_api_url()),
        };

        let api_url = std::env::var("SITE_API_URL").unwrap_or_else(|_| default_site_api_url());
        let items_url = std::env::var("ITEMS_URL")
            .unwrap_or_else(|_| format!("{}/api/items", api_url.trim_end_matches('/')));
        let site = SiteConfig { api_url, items_url };

        let session = SessionConfig {
            cookie_secure: match std::env::var("COOKIE_SECURE") {
                Ok(value) => parse_bool("COOKIE_SECURE", &value)?,
                Err(_) => default_cookie_secure(),
            },
        };

        let server = ServerConfig {
            host: std::env::var("HOST").unwrap_or_else(|_| default_host()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_port),
        };

        Ok(Self {
            discord,
            site,
            session,
            server,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv(name, value.to_string())),
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for environment variable {0}: {1:?}")]
    InvalidEnv(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discord_config(api_url: &str) -> DiscordConfig {
        DiscordConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:3000/login".to_string(),
            oauth_url: "https://discord.com/oauth2/authorize?client_id=client".to_string(),
            api_url: api_url.to_string(),
        }
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_session_config_defaults_to_secure_cookies() {
        assert!(SessionConfig::default().cookie_secure);
    }

    #[test]
    fn test_discord_endpoints_ignore_trailing_slash() {
        let config = discord_config("https://discord.com/api/");
        assert_eq!(config.token_url(), "https://discord.com/api/oauth2/token");
        assert_eq!(config.current_user_url(), "https://discord.com/api/users/@me");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(matches!(
            parse_bool("X", "maybe"),
            Err(ConfigError::InvalidEnv("X", _))
        ));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnv("TEST_VAR");
        assert_eq!(
            err.to_string(),
            "missing required environment variable: TEST_VAR"
        );
    }
}
