//! Discord token grants and the cookies that persist them.

use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::error::{Error, Result};

/// Cookie holding the Discord access token.
pub const ACCESS_TOKEN_COOKIE: &str = "discord_access_token";
/// Cookie holding the Discord refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "discord_refresh_token";

/// Lifetime of the refresh token cookie.
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(30);

/// Successful Discord `OAuth2` token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenGrant {
    /// When the access token stops being valid.
    ///
    /// Negative lifetimes and expiries past the representable range are
    /// rejected as a bad Discord response.
    pub fn access_expires_at(&self, issued_at: OffsetDateTime) -> Result<OffsetDateTime> {
        if self.expires_in < 0 {
            return Err(Error::DiscordApi(format!(
                "negative expires_in in token response: {}",
                self.expires_in
            )));
        }
        issued_at
            .checked_add(Duration::seconds(self.expires_in))
            .ok_or_else(|| {
                Error::DiscordApi(format!(
                    "expires_in out of range in token response: {}",
                    self.expires_in
                ))
            })
    }
}

fn session_cookie(name: &'static str, value: String, expires: OffsetDateTime, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .expires(expires)
        .build()
}

/// Build the access and refresh token cookies for a fresh grant.
pub fn session_cookies(
    grant: &TokenGrant,
    issued_at: OffsetDateTime,
    secure: bool,
) -> Result<[Cookie<'static>; 2]> {
    Ok([
        session_cookie(
            ACCESS_TOKEN_COOKIE,
            grant.access_token.clone(),
            grant.access_expires_at(issued_at)?,
            secure,
        ),
        session_cookie(
            REFRESH_TOKEN_COOKIE,
            grant.refresh_token.clone(),
            issued_at + REFRESH_TOKEN_TTL,
            secure,
        ),
    ])
}

/// Removal cookies for both session tokens.
#[must_use]
pub fn clear_session_cookies() -> [Cookie<'static>; 2] {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE].map(|name| {
        Cookie::build((name, ""))
            .path("/")
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
    })
}
