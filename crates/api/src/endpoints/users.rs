//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use tidepub_common::{AppResult, CursorPage};
use tidepub_core::{FollowUserDto, UserDto, UserSpec};

use crate::{extractors::AuthUser, middleware::AppState, response::ok};

/// Query parameters for cursor-paginated listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

/// Look up a user profile.
///
/// The path segment accepts `@username`, `@username@hostname`, or a raw
/// user ID.
async fn show(
    State(state): State<AppState>,
    Path(spec): Path<String>,
) -> AppResult<Json<UserDto>> {
    let spec: UserSpec = spec.parse()?;
    let user = state.user_service.get_user(&spec).await?;

    Ok(Json(user))
}

/// Follow the addressed user.
async fn follow(
    AuthUser(actor_id): AuthUser,
    State(state): State<AppState>,
    Path(spec): Path<String>,
) -> AppResult<impl IntoResponse> {
    let spec: UserSpec = spec.parse()?;
    let followee_id = state.user_service.find_user_id(&spec).await?;
    state.follow_service.follow(&actor_id, &followee_id).await?;

    Ok(ok())
}

/// Stop following the addressed user.
async fn unfollow(
    AuthUser(actor_id): AuthUser,
    State(state): State<AppState>,
    Path(spec): Path<String>,
) -> AppResult<impl IntoResponse> {
    let spec: UserSpec = spec.parse()?;
    let followee_id = state.user_service.find_user_id(&spec).await?;
    state
        .follow_service
        .unfollow(&actor_id, &followee_id)
        .await?;

    Ok(ok())
}

/// List the users following the addressed user, newest first.
async fn followers(
    State(state): State<AppState>,
    Path(spec): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CursorPage<FollowUserDto>>> {
    let spec: UserSpec = spec.parse()?;
    let user_id = state.user_service.find_user_id(&spec).await?;
    let limit = state.page_limit(query.limit);
    let page = state
        .follow_service
        .get_followers(&user_id, limit, query.cursor)
        .await?;

    Ok(Json(page))
}

/// List the users the addressed user follows, newest first.
async fn following(
    State(state): State<AppState>,
    Path(spec): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CursorPage<FollowUserDto>>> {
    let spec: UserSpec = spec.parse()?;
    let user_id = state.user_service.find_user_id(&spec).await?;
    let limit = state.page_limit(query.limit);
    let page = state
        .follow_service
        .get_following(&user_id, limit, query.cursor)
        .await?;

    Ok(Json(page))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{spec}", get(show))
        .route("/users/{spec}/follow", put(follow).delete(unfollow))
        .route("/users/{spec}/followers", get(followers))
        .route("/users/{spec}/following", get(following))
}
