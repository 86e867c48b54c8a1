//! Discord `OAuth2` login and logout routes.

use axum::{
    extract::{RawQuery, State},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use time::OffsetDateTime;

use crate::{
    error::{Error, Result},
    models::session::{clear_session_cookies, session_cookies},
    routes::found,
    SharedState,
};

/// First value of `key` in the query string.
///
/// Repeated keys keep the first occurrence and an unparseable query reads as
/// empty, so these routes never reject a request over its query.
fn first_param(query: Option<&str>, key: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.unwrap_or_default())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring malformed query string");
            Vec::new()
        });
    pairs.into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Start the Discord login, or finish it when Discord sends the user back
/// with an authorization code.
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Result<(CookieJar, Response)> {
    let Some(code) = first_param(query.as_deref(), "code").filter(|code| !code.is_empty()) else {
        return Ok((jar, found(&state.config.discord.oauth_url)));
    };

    tracing::info!("Exchanging authorization code for access token");

    let grant = state.oauth.exchange_code(&code).await.map_err(|e| {
        match &e {
            Error::OAuthProvider(payload) => {
                tracing::error!(%payload, "Discord rejected the authorization code");
            }
            other => tracing::error!("Failed to exchange code with Discord: {}", other),
        }
        e
    })?;

    let issued_at = OffsetDateTime::now_utc();
    let jar = session_cookies(&grant, issued_at, state.config.session.cookie_secure)
        .map_err(|e| {
            tracing::error!("Unusable token grant from Discord: {}", e);
            e
        })?
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie));

    tracing::info!("Session cookies issued");
    Ok((jar, found("/")))
}

/// Clear the session cookies and send the user on.
pub async fn logout(jar: CookieJar, RawQuery(query): RawQuery) -> (CookieJar, Response) {
    let jar = clear_session_cookies()
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie));

    let next = first_param(query.as_deref(), "next");
    (jar, found(redirect_target(next.as_deref())))
}

/// Where to send the user after logout: `next` when it is a path on this
/// site, `/` otherwise.
fn redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(next) if is_local_path(next) => next,
        Some(next) if !next.is_empty() => {
            tracing::warn!(next, "ignoring off-site logout redirect");
            "/"
        }
        _ => "/",
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control)
}
