use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;

use super::Deleted;
use crate::database::models::{Group, GroupPayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSearchQuery {
    #[serde(default)]
    pub name_substring: String,
    pub limit: Option<usize>,
}

fn validated(payload: Result<Json<GroupPayload>, JsonRejection>) -> Result<GroupPayload, ApiError> {
    let Json(payload) = payload?;
    payload
        .validate()
        .map_err(|errors| ApiError::validation_error("Invalid group payload", Some(errors)))?;
    Ok(payload)
}

/// GET /group?nameSubstring=&limit=
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<GroupSearchQuery>, QueryRejection>,
) -> ApiResult<Vec<Group>> {
    let Query(query) = query?;
    let limit = state.limits.resolve(query.limit);
    Ok(ApiResponse::success(
        state.groups.search(&query.name_substring, limit).await?,
    ))
}

/// GET /group/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Group> {
    Ok(ApiResponse::success(state.groups.get(&id).await?))
}

/// POST /group
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<GroupPayload>, JsonRejection>,
) -> ApiResult<Group> {
    let payload = validated(payload)?;
    let group = state.groups.create(payload).await?;
    tracing::info!(group_id = %group.id, by = %auth.user_id, by_login = %auth.login, "group created");
    Ok(ApiResponse::created(group))
}

/// PUT /group/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<GroupPayload>, JsonRejection>,
) -> ApiResult<Group> {
    let payload = validated(payload)?;
    Ok(ApiResponse::success(state.groups.update(&id, payload).await?))
}

/// DELETE /group/:id - Soft delete
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let deleted = state.groups.remove_softly(&id).await?;
    tracing::info!(group_id = %id, by = %auth.user_id, by_login = %auth.login, "group soft deleted");
    Ok(ApiResponse::success(Deleted { deleted }))
}
