use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /auth/me - identity carried by the bearer token
pub async fn me_get(user: AuthUser) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "user": user })))
}
