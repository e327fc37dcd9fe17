use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::SUGGESTION_CONTEXT_TASKS;
use crate::database::models::TaskQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    /// Free text forwarded into the prompt.
    pub context: Option<String>,
}

/// GET /tasks/ai/suggestions - proposed tasks based on the caller's recent ones
///
/// Always 200 once the caller's tasks are loaded; vendor trouble yields the
/// static fallback list.
pub async fn suggestions_get(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SuggestionQuery>,
) -> ApiResult<Value> {
    let recent = TaskQuery { limit: Some(SUGGESTION_CONTEXT_TASKS), ..Default::default() };
    let tasks = state.tasks.list_tasks(user.id, &recent).await?;

    let suggestions = state
        .suggestions
        .generate_task_suggestions(&tasks, query.context.as_deref())
        .await;

    Ok(ApiResponse::success(json!({ "suggestions": suggestions })))
}
