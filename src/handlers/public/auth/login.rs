use axum::{body::Bytes, extract::State};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::auth::{verify_user_password, AuthError};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{parse_json_body, validate_login};

/// POST /auth/login - exchange email and password for a bearer token
///
/// Unknown email and wrong password produce the same 401.
pub async fn login_post(State(state): State<AppState>, body: Bytes) -> ApiResult<Value> {
    let login = validate_login(&parse_json_body(&body)?)?;

    let user = state.users.find_user_by_email(&login.email).await?;
    let verified = verify_user_password(&login.password, user.as_ref().map(|u| u.password_hash.as_str()));
    let user = match user {
        Some(user) if verified => user,
        _ => {
            debug!("Failed login for {}", login.email);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.tokens.issue(&user)?;
    info!("User {} logged in", user.id);

    Ok(ApiResponse::success(json!({
        "user": user,
        "token": token,
    })))
}
