//! Loaders for the signed-in user's section of the dashboard.

use std::{future::Future, sync::Arc};

use axum::{
    extract::{OriginalUri, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    auth::require_user,
    deferred::{Deferred, StreamedPayload},
    error::Result,
    models::{GambleGameStats, Session},
    SharedState,
};

/// Cache policy for the stats page.
pub const STATS_CACHE_CONTROL: &str = "max-age=600";

/// `GET /me`: profile data for the signed-in user.
pub async fn me_layout(
    State(state): State<SharedState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> Result<Response> {
    let user_id = match require_user(&session, uri.path()) {
        Ok(user_id) => user_id,
        Err(redirect) => return Ok(redirect),
    };

    Ok(load_me(&state, user_id).await?.into_response())
}

/// `GET /me/stats`: statistics for the signed-in user.
pub async fn me_stats(
    State(state): State<SharedState>,
    session: Session,
    OriginalUri(uri): OriginalUri,
) -> Result<Response> {
    if let Err(redirect) = require_user(&session, uri.path()) {
        return Ok(redirect);
    }

    match load_stats(&state, &session).await? {
        Some(payload) => Ok(([(header::CACHE_CONTROL, STATS_CACHE_CONTROL)], payload).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Items and base profile up front, full profile deferred.
pub async fn load_me(state: &SharedState, user_id: &str) -> Result<StreamedPayload> {
    tracing::debug!(user_id, "loading profile");

    let (items, base_data) = tokio::try_join!(state.site.items(), state.site.base_user(user_id))?;

    let user_data = spawn_for_user(state, user_id, |state, user_id| async move {
        state.site.user(&user_id).await
    });

    Ok(StreamedPayload::new()
        .field("items", items)?
        .field("baseData", base_data)?
        .deferred("userData", user_data))
}

/// Item catalogue up front, every statistic deferred.
///
/// Anonymous sessions get `None` without touching storage.
pub async fn load_stats(state: &SharedState, session: &Session) -> Result<Option<StreamedPayload>> {
    let Some(user_id) = session.user_id() else {
        return Ok(None);
    };

    tracing::debug!(user_id, "loading stats");

    let items = state.site.items().await?;

    let command_stats = spawn_for_user(state, user_id, |state, user_id| async move {
        state.storage.command_stats(&user_id).await
    });
    let item_stats = spawn_for_user(state, user_id, |state, user_id| async move {
        state.storage.item_stats(&user_id).await
    });
    let leaderboards = spawn_for_user(state, user_id, |state, user_id| async move {
        state.storage.leaderboards(&user_id).await
    });
    let scratch_stats = spawn_for_user(state, user_id, |state, user_id| async move {
        state.storage.scratch_stats(&user_id).await
    });
    let gamble_stats = spawn_for_user(state, user_id, gamble_stats_with_wins);

    let payload = StreamedPayload::new()
        .field("items", items)?
        .deferred("commandStats", command_stats)
        .deferred("itemStats", item_stats)
        .deferred("leaderboards", leaderboards)
        .deferred("scratchStats", scratch_stats)
        .deferred("gambleStats", gamble_stats);

    Ok(Some(payload))
}

/// Gambling stats with each game's win count filled in, one game at a time.
async fn gamble_stats_with_wins(state: SharedState, user_id: String) -> Result<Vec<GambleGameStats>> {
    let mut games = state.storage.gamble_stats(&user_id).await?;
    for game in &mut games {
        game.wins = state.storage.count_wins(&user_id, &game.game).await?;
    }
    Ok(games)
}

fn spawn_for_user<T, F, Fut>(state: &SharedState, user_id: &str, load: F) -> Deferred<T>
where
    T: Send + 'static,
    F: FnOnce(SharedState, String) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Deferred::spawn(load(Arc::clone(state), user_id.to_string()))
}
