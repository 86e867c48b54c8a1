//! Session resolution and the login gate.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    models::{session::ACCESS_TOKEN_COOKIE, Session},
    routes::found,
    AppState, SharedState,
};

/// Resolve the session carried by the request cookies.
///
/// Any problem talking to Discord downgrades the request to anonymous; the
/// extractor never rejects.
pub async fn resolve_session(state: &AppState, jar: &CookieJar) -> Session {
    let Some(token) = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()) else {
        return Session::Anonymous;
    };
    if token.is_empty() {
        return Session::Anonymous;
    }

    match state.oauth.identify(&token).await {
        Ok(Some(identity)) => {
            tracing::debug!(user_id = %identity.id, username = %identity.username, "resolved session");
            Session::authenticated(identity.id)
        }
        Ok(None) => {
            tracing::debug!("access token rejected by Discord");
            Session::Anonymous
        }
        Err(e) => {
            tracing::warn!("Failed to resolve session: {}", e);
            Session::Anonymous
        }
    }
}

impl FromRequestParts<SharedState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(resolve_session(state, &jar).await)
    }
}

/// Login URL that returns the user to `path` afterwards.
#[must_use]
pub fn login_url(path: &str) -> String {
    format!("/login?next={}", urlencoding::encode(path))
}

/// Require an authenticated session, or redirect to the login page.
///
/// Returns the Discord user ID on success.
pub fn require_user<'a>(session: &'a Session, path: &str) -> Result<&'a str, Response> {
    session.user_id().ok_or_else(|| found(&login_url(path)))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};

    use super::*;

    #[test]
    fn test_login_url_encodes_path() {
        assert_eq!(login_url("/me/stats"), "/login?next=%2Fme%2Fstats");
    }

    #[test]
    fn test_require_user_authenticated() {
        let session = Session::authenticated("123");
        assert_eq!(require_user(&session, "/me").unwrap(), "123");
    }

    #[test]
    fn test_require_user_redirects_anonymous() {
        let response = require_user(&Session::Anonymous, "/me").unwrap_err();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?next=%2Fme"
        );
    }
}
