//! Request-scoped user identity and profile documents.

use serde::Deserialize;

/// Base profile returned by `/api/user/{id}/base`. The shape is owned by the
/// site user API and passed through untouched.
pub type BaseUserData = serde_json::Value;

/// Full profile returned by `/api/user/{id}`.
pub type UserData = serde_json::Value;

/// Who is making the current request.
///
/// Resolved once per request from the session cookies and handed explicitly
/// to every loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Discord user holding a valid access token.
    Authenticated {
        /// Discord user ID (snowflake).
        id: String,
    },
    /// No session cookie, or Discord did not accept it.
    Anonymous,
}

impl Session {
    /// Create an authenticated session for the given Discord user ID.
    pub fn authenticated(id: impl Into<String>) -> Self {
        Self::Authenticated { id: id.into() }
    }

    /// Returns the Discord user ID if the session is authenticated.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Authenticated { id } => Some(id),
            Self::Anonymous => None,
        }
    }

    /// Returns true if the request carries a valid Discord session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Discord user as returned by `/users/@me`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordIdentity {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}
