use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "usergroup-api",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "login": "POST /login (public - token acquisition)",
                "user": "/user[/:id] (protected)",
                "group": "/group[/:id] (protected)",
            }
        }
    }))
}

/// GET /health - Liveness plus a storage ping; 503 when storage is unreachable
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.storage.health_check().await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "storage": state.storage.label()
        }
    })))
}
