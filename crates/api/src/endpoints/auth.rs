//! Authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use tidepub_common::AppResult;
use tidepub_store::values::ObjectId;
use validator::Validate;

use crate::{middleware::AppState, response::created};

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    pub nickname: Option<String>,
}

/// Registration response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: ObjectId,
}

/// Create a new local account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;

    let user_id = state
        .auth_service
        .register(&req.username, &req.password, req.nickname.as_deref())
        .await?;

    Ok(created(RegisterResponse { user_id }))
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
}

/// Exchange credentials for a bearer token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let token = state
        .auth_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_accepts_camel_case() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","password":"secret","nickname":"Alice"}"#)
                .unwrap();

        assert_eq!(req.username, "alice");
        assert_eq!(req.nickname.as_deref(), Some("Alice"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_short_username() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"ab","password":"secret"}"#).unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_empty_password() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","password":""}"#).unwrap();

        assert!(req.validate().is_err());
    }
}
