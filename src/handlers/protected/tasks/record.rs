use axum::{
    body::Bytes,
    extract::{Path, State},
};
use serde_json::{json, Value};
use tracing::info;

use super::{parse_task_id, task_error};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::{parse_json_body, validate_task};

/// GET /tasks/:id
pub async fn get(State(state): State<AppState>, user: AuthUser, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_task_id(&id)?;
    let task = state.tasks.get_task(user.id, id).await.map_err(task_error)?;
    Ok(ApiResponse::success(json!({ "task": task })))
}

/// PUT /tasks/:id - full replacement of the editable fields
///
/// Ownership is checked before the body is validated, so a foreign or
/// missing id is a 404 whatever the payload.
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Value> {
    let id = parse_task_id(&id)?;
    state.tasks.get_task(user.id, id).await.map_err(task_error)?;

    let draft = validate_task(&parse_json_body(&body)?)?;
    let task = state.tasks.update_task(user.id, id, draft).await.map_err(task_error)?;
    info!("User {} updated task {}", user.id, task.id);

    Ok(ApiResponse::success(json!({
        "task": task,
        "message": "Task updated successfully",
    })))
}

/// DELETE /tasks/:id
pub async fn delete(State(state): State<AppState>, user: AuthUser, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_task_id(&id)?;
    state.tasks.delete_task(user.id, id).await.map_err(task_error)?;
    info!("User {} deleted task {}", user.id, id);

    Ok(ApiResponse::success(json!({ "message": "Task deleted successfully" })))
}
