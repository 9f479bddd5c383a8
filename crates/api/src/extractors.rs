//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use tidepub_common::AppError;
use tidepub_store::values::ObjectId;

/// Authenticated caller extractor.
///
/// Rejects the request when no valid bearer token was presented.
#[derive(Debug, Clone)]
pub struct AuthUser(pub ObjectId);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware when a valid token is presented
        parts
            .extensions
            .get::<ObjectId>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated caller extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<ObjectId>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<ObjectId>().cloned()))
    }
}
