use axum::{
    body::Bytes,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::TaskQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::{parse_json_body, validate_task};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Unrecognized status or priority values are dropped, not rejected.
    fn into_task_query(self) -> TaskQuery {
        TaskQuery {
            status: self.status.and_then(|s| s.parse().ok()),
            priority: self.priority.and_then(|p| p.parse().ok()),
            search: self.search,
            limit: None,
        }
    }
}

/// GET /tasks - the caller's tasks, newest first
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let tasks = state.tasks.list_tasks(user.id, &query.into_task_query()).await?;
    Ok(ApiResponse::success(json!({ "tasks": tasks })))
}

/// POST /tasks - create a task owned by the caller
pub async fn post(State(state): State<AppState>, user: AuthUser, body: Bytes) -> ApiResult<Value> {
    let draft = validate_task(&parse_json_body(&body)?)?;
    let task = state.tasks.create_task(user.id, draft).await?;
    info!("User {} created task {}", user.id, task.id);

    Ok(ApiResponse::created(json!({
        "task": task,
        "message": "Task created successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{TaskPriority, TaskStatus};

    #[test]
    fn ignores_unknown_filter_values() {
        let query = ListQuery {
            status: Some("archived".into()),
            priority: Some("high".into()),
            search: Some("milk".into()),
        }
        .into_task_query();
        assert_eq!(query.status, None);
        assert_eq!(query.priority, Some(TaskPriority::High));
        assert_eq!(query.search.as_deref(), Some("milk"));

        let query = ListQuery { status: Some("in_progress".into()), ..Default::default() }.into_task_query();
        assert_eq!(query.status, Some(TaskStatus::InProgress));
    }
}
