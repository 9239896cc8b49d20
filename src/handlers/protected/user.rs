use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;

use super::Deleted;
use crate::database::models::{User, UserPayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchQuery {
    #[serde(default)]
    pub login_substring: String,
    pub limit: Option<usize>,
}

fn validated(payload: Result<Json<UserPayload>, JsonRejection>) -> Result<UserPayload, ApiError> {
    let Json(payload) = payload?;
    payload
        .validate()
        .map_err(|errors| ApiError::validation_error("Invalid user payload", Some(errors)))?;
    Ok(payload)
}

/// GET /user?loginSubstring=&limit= - Users whose login contains the substring
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<UserSearchQuery>, QueryRejection>,
) -> ApiResult<Vec<User>> {
    let Query(query) = query?;
    let limit = state.limits.resolve(query.limit);
    let users = state.users.search(&query.login_substring, limit).await?;
    Ok(ApiResponse::success(users))
}

/// GET /user/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.get(&id).await?))
}

/// POST /user - Create a user; the id is assigned by storage
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<User> {
    let payload = validated(payload)?;
    let user = state.users.create(payload).await?;
    tracing::info!(user_id = %user.id, by = %auth.user_id, by_login = %auth.login, "user created");
    Ok(ApiResponse::created(user))
}

/// PUT /user/:id - Replace login, password and age
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<User> {
    let payload = validated(payload)?;
    Ok(ApiResponse::success(state.users.update(&id, payload).await?))
}

/// DELETE /user/:id - Soft delete
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let deleted = state.users.remove_softly(&id).await?;
    tracing::info!(user_id = %id, by = %auth.user_id, by_login = %auth.login, "user soft deleted");
    Ok(ApiResponse::success(Deleted { deleted }))
}
