//! Reaction endpoints.
//!
//! Favorites, bookmarks, and emoji reactions all live under the addressed
//! post. Adding one is idempotent and removing an absent one succeeds, so
//! every handler here answers with an empty response.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::put,
};
use serde::Deserialize;
use tidepub_common::AppResult;
use tidepub_store::values::ObjectId;

use crate::{extractors::AuthUser, middleware::AppState, response::ok};

/// Emoji reaction body.
#[derive(Debug, Deserialize)]
pub struct EmojiBody {
    pub emoji: String,
}

/// Favorite a post.
async fn add_favorite(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post_id: ObjectId = post_id.parse()?;
    state
        .reaction_service
        .add_favorite(&user_id, &post_id)
        .await?;

    Ok(ok())
}

/// Remove a favorite.
async fn remove_favorite(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post_id: ObjectId = post_id.parse()?;
    state
        .reaction_service
        .remove_favorite(&user_id, &post_id)
        .await?;

    Ok(ok())
}

/// Bookmark a post.
async fn add_bookmark(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post_id: ObjectId = post_id.parse()?;
    state
        .reaction_service
        .add_bookmark(&user_id, &post_id)
        .await?;

    Ok(ok())
}

/// Remove a bookmark.
async fn remove_bookmark(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post_id: ObjectId = post_id.parse()?;
    state
        .reaction_service
        .remove_bookmark(&user_id, &post_id)
        .await?;

    Ok(ok())
}

/// React to a post with an emoji.
async fn add_emoji(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(body): Json<EmojiBody>,
) -> AppResult<impl IntoResponse> {
    let post_id: ObjectId = post_id.parse()?;
    state
        .reaction_service
        .add_emoji(&user_id, &post_id, &body.emoji)
        .await?;

    Ok(ok())
}

/// Remove an emoji reaction.
async fn remove_emoji(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(body): Json<EmojiBody>,
) -> AppResult<impl IntoResponse> {
    let post_id: ObjectId = post_id.parse()?;
    state
        .reaction_service
        .remove_emoji(&user_id, &post_id, &body.emoji)
        .await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/{id}/favorite",
            put(add_favorite).delete(remove_favorite),
        )
        .route(
            "/posts/{id}/bookmark",
            put(add_bookmark).delete(remove_bookmark),
        )
        .route("/posts/{id}/reactions", put(add_emoji).delete(remove_emoji))
}
