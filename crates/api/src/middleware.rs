//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tidepub_common::{AppError, config::PaginationConfig};
use tidepub_core::{AuthService, FollowService, PostService, ReactionService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub post_service: PostService,
    pub follow_service: FollowService,
    pub reaction_service: ReactionService,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Clamp a client-supplied page size to the configured bounds.
    #[must_use]
    pub fn page_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.pagination.default_limit)
            .min(self.pagination.max_limit)
    }
}

/// Authentication middleware.
///
/// Resolves a bearer token into the calling user's ID and stores it in the
/// request extensions for the extractors to pick up. Requests without an
/// `Authorization` header pass through anonymously; a header that is
/// present but unusable is rejected here, so handlers never see a
/// half-authenticated request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization") {
        let Some(token) = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
        else {
            return AppError::BadRequest("Authorization header must carry a bearer token".into())
                .into_response();
        };

        match state.auth_service.verify_token(token).await {
            Ok(user_id) => {
                req.extensions_mut().insert(user_id);
            }
            Err(err) => return err.into_response(),
        }
    }

    next.run(req).await
}
