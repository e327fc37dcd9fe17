use axum::{body::Bytes, extract::State};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::{parse_json_body, validate_categorize};

/// POST /tasks/ai/categorize - proposed tags and priority for a title/description
pub async fn categorize_post(State(state): State<AppState>, _user: AuthUser, body: Bytes) -> ApiResult<Value> {
    let (title, description) = validate_categorize(&parse_json_body(&body)?)?;
    let categorization = state.suggestions.categorize_task(&title, &description).await;
    Ok(ApiResponse::success(json!({ "categorization": categorization })))
}
