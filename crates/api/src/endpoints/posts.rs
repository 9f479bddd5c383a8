//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tidepub_common::AppResult;
use tidepub_core::{CreatePostCmd, PostDto};
use tidepub_store::values::{ObjectId, Privacy};
use validator::Validate;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{created, ok},
};

/// Create post request.
///
/// Exactly four field combinations are accepted: content alone (normal
/// post), content plus `replyToId` (reply), `repostOfId` alone (repost),
/// and content plus `repostOfId` (quote).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(max = 2048))]
    pub content: Option<String>,

    pub privacy: Privacy,

    pub reply_to_id: Option<String>,

    pub repost_of_id: Option<String>,
}

/// Create post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub post_id: ObjectId,
}

/// Publish a new post, reply, repost, or quote.
async fn create(
    AuthUser(author_id): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;

    let cmd = CreatePostCmd::from_parts(
        req.content,
        req.privacy,
        req.reply_to_id,
        req.repost_of_id,
    )?;
    let post = state.post_service.create(&author_id, cmd).await?;

    Ok(created(CreatePostResponse { post_id: post.id }))
}

/// Fetch a post, subject to the caller's visibility.
async fn show(
    MaybeAuthUser(viewer_id): MaybeAuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<PostDto>> {
    let post_id: ObjectId = post_id.parse()?;
    let post = state
        .post_service
        .fetch_post(viewer_id.as_ref(), &post_id)
        .await?;

    Ok(Json(post))
}

/// Delete a post. Only the author may do this.
async fn delete(
    AuthUser(actor_id): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let post_id: ObjectId = post_id.parse()?;
    state.post_service.delete_post(&actor_id, &post_id).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create))
        .route("/posts/{id}", get(show).delete(delete))
}
