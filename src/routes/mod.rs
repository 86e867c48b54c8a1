//! HTTP route handlers.

pub mod auth;
pub mod me;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::SharedState;

pub use auth::{login, logout};
pub use me::{load_me, load_stats, me_layout, me_stats};

/// Create an Axum router with all dashboard routes.
///
/// Routes:
/// - `GET /login` - Start the Discord login, or finish it when `code` is given
/// - `GET /logout` - Clear the session cookies
/// - `GET /me` - Profile data for the signed-in user
/// - `GET /me/stats` - Statistics for the signed-in user
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/login", get(login))
        .route("/logout", get(logout))
        .route("/me", get(me_layout))
        .route("/me/stats", get(me_stats))
}

/// `302 Found` redirect to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
