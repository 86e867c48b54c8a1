//! Error types for the stats dashboard service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Discord rejected the token exchange; carries Discord's error payload.
    #[error("oauth provider error: {0}")]
    OAuthProvider(serde_json::Value),

    /// Discord API request failed.
    #[error("discord API error: {0}")]
    DiscordApi(String),

    /// Site API request failed.
    #[error("site API error: {0}")]
    SiteApi(String),

    /// Background task failed.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Storage-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database query failed.
    #[cfg(feature = "sqlx-storage")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic storage error for non-sqlx backends.
    #[error("storage error: {0}")]
    Other(String),
}

impl Error {
    /// HTTP status this error is reported with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Storage(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::OAuthProvider(_) => StatusCode::BAD_REQUEST,
            Error::DiscordApi(_) | Error::SiteApi(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Body reported for a failed code exchange: a fixed message merged with the
/// provider payload, provider fields winning on conflict.
fn provider_error_body(payload: &serde_json::Value) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert(
        "message".to_string(),
        serde_json::Value::String("something went wrong".to_string()),
    );
    match payload {
        serde_json::Value::Object(fields) => {
            body.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        other => {
            body.insert("error".to_string(), other.clone());
        }
    }
    serde_json::Value::Object(body)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Error::OAuthProvider(payload) => (status, Json(provider_error_body(payload))).into_response(),
            Error::Storage(_) | Error::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (status, "internal error".to_string()).into_response()
            }
            _ => (status, self.to_string()).into_response(),
        }
    }
}
