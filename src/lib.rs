pub mod ai;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod validation;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{ai, auth, tasks};

    Router::new()
        .route("/auth/me", get(auth::me_get))
        // Collection
        .route("/tasks", get(tasks::schema_get).post(tasks::schema_post))
        // AI helpers; static segments win over the :id capture
        .route("/tasks/ai/suggestions", get(ai::suggestions_get))
        .route("/tasks/ai/categorize", post(ai::categorize_post))
        // Individual task
        .route(
            "/tasks/:id",
            get(tasks::record_get).put(tasks::record_put).delete(tasks::record_delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

/// `*` anywhere in the list allows every origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Taskboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health (public)",
            "auth": "/auth/register, /auth/login (public), /auth/me (protected)",
            "tasks": "/tasks[/:id] (protected)",
            "ai": "/tasks/ai/suggestions, /tasks/ai/categorize (protected)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.tasks.health_check().await.map_err(|e| {
        warn!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok",
        })),
    ))
}
