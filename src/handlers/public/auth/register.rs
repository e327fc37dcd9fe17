use axum::{body::Bytes, extract::State};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::hash_password;
use crate::database::manager::DatabaseError;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{parse_json_body, validate_registration};

/// POST /auth/register - create an account and sign it in
pub async fn register_post(State(state): State<AppState>, body: Bytes) -> ApiResult<Value> {
    let registration = validate_registration(&parse_json_body(&body)?)?;
    let password_hash = hash_password(&registration.password)?;

    let user = state
        .users
        .create_user(NewUser {
            name: registration.name,
            email: registration.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::conflict("An account with this email already exists"),
            other => other.into(),
        })?;

    let token = state.tokens.issue(&user)?;
    info!("Registered user {}", user.id);

    Ok(ApiResponse::created(json!({
        "user": user,
        "token": token,
        "message": "User registered successfully",
    })))
}
