//! API response helpers.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Empty success response.
#[must_use]
pub fn ok() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Resource creation response.
pub fn created<T: Serialize>(body: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(body))
}
