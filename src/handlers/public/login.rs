use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::auth::{LoginCredentials, LoginRequest};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// POST /login - Exchange login and password for a bearer token
///
/// Expected Input:
/// ```json
/// { "login": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expires_in": 604800,
///     "user": { "id": "...", "login": "...", "age": 30, "isDeleted": false }
///   }
/// }
/// ```
///
/// Malformed payloads are 400, unknown login or wrong password is 401.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let credentials = LoginCredentials::try_from(request)?;

    let user = state
        .users
        .check_user_credentials(credentials.login(), credentials.password())
        .await?
        .ok_or_else(|| {
            tracing::info!(login = credentials.login(), "login rejected");
            ApiError::unauthorized("Wrong login or password")
        })?;

    let issued = state.jwt.issue(&user)?;
    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(ApiResponse::success(LoginResponse {
        token: issued.token,
        expires_in: issued.expires_in,
        user,
    }))
}
