//! Registration and login handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use notekeeper_core::User;

use crate::{ApiError, ApiJson, AppState};

/// Email and password pair used by register and login.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Register a new user.
///
/// POST /api/users/register
#[utoipa::path(post, path = "/api/users/register", tag = "Users",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid email or blank password", body = crate::error::ErrorBody),
        (status = 409, description = "Email already in use", body = crate::error::ErrorBody)
    ))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.accounts.register(&req.email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange credentials for a bearer token.
///
/// POST /api/users/login
#[utoipa::path(post, path = "/api/users/login", tag = "Users",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 403, description = "Wrong password", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown email", body = crate::error::ErrorBody)
    ))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .accounts
        .login(&req.email, &req.password, Utc::now())
        .await?;
    Ok(Json(TokenResponse { token }))
}
