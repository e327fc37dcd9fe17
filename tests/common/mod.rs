#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap},
    routing::post,
    Json, Router,
};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use taskboard_api::{
    ai::GenAiClient,
    app,
    config::{AppConfig, GenAiConfig},
    database::{MemoryStore, TaskStore, UserStore},
    state::AppState,
};

/// Bind an unused local port; the listener is live before anything is spawned
/// on it, so callers never race the server.
async fn bind_local() -> Result<(TcpListener, String)> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port)).await.context("failed to bind test port")?;
    Ok((listener, format!("http://127.0.0.1:{}", port)))
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config
}

/// The full router over a fresh in-memory store.
pub struct TestServer {
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    /// No vendor key configured, so AI routes always use the fallbacks.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(GenAiConfig::default()).await
    }

    pub async fn spawn_with(genai: GenAiConfig) -> Result<Self> {
        let mut config = test_config();
        config.genai = genai;
        Self::spawn_config(config).await
    }

    pub async fn spawn_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::spawn_store(config, store.clone(), store).await
    }

    /// Serve the router over the given stores, e.g. a `PgStore`.
    pub async fn spawn_store(config: AppConfig, tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>) -> Result<Self> {
        let generator = Arc::new(GenAiClient::new(config.genai.clone())?);
        let state = AppState::new(&config, tasks, users, generator)?;

        let (listener, base_url) = bind_local().await?;
        tokio::spawn(async move { axum::serve(listener, app(state)).await });

        Ok(Self { base_url, client: reqwest::Client::new() })
    }

    pub async fn send(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    /// POST an arbitrary body with a JSON content type.
    pub async fn post_raw(&self, path: &str, token: Option<&str>, body: &'static str) -> Result<(StatusCode, Value)> {
        let mut req = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("content-type", "application/json")
            .body(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        let status = res.status();
        Ok((status, res.json::<Value>().await.unwrap_or(Value::Null)))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, Some(token), None).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        let body = json!({ "name": name, "email": email, "password": password });
        self.send(Method::POST, "/auth/register", None, Some(body)).await
    }

    /// Register a user and return their bearer token.
    pub async fn signup(&self, email: &str) -> Result<String> {
        let (status, body) = self.register("Test User", email, "secret123").await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        body["token"].as_str().map(str::to_string).context("register response without token")
    }

    pub async fn create_task(&self, token: &str, body: Value) -> Result<Value> {
        let (status, body) = self.post("/tasks", token, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create failed: {} {}", status, body);
        Ok(body["task"].clone())
    }
}

/// A request as received by [`FakeVendor`].
#[derive(Debug, Clone)]
pub struct Captured {
    pub authorization: Option<String>,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct VendorState {
    status: StatusCode,
    reply: String,
    seen: Arc<Mutex<Vec<Captured>>>,
}

/// Stand-in for a text-generation vendor. `/chat` answers in the
/// chat-completion shape and `/parts` in the prompt-parts shape, both with
/// the same canned text.
pub struct FakeVendor {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Captured>>>,
}

impl FakeVendor {
    pub async fn spawn(reply: &str) -> Result<Self> {
        Self::spawn_with_status(StatusCode::OK, reply).await
    }

    pub async fn spawn_with_status(status: StatusCode, reply: &str) -> Result<Self> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = VendorState { status, reply: reply.to_string(), seen: seen.clone() };
        let router = Router::new()
            .route("/chat", post(chat_reply))
            .route("/parts", post(parts_reply))
            .with_state(state);

        let (listener, base_url) = bind_local().await?;
        tokio::spawn(async move { axum::serve(listener, router).await });
        Ok(Self { base_url, seen })
    }

    pub fn config(&self, provider: &str, path: &str) -> GenAiConfig {
        GenAiConfig {
            provider: provider.parse().unwrap(),
            api_key: Some("test-key".to_string()),
            api_url: Some(format!("{}{}", self.base_url, path)),
            ..GenAiConfig::default()
        }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.seen.lock().unwrap().clone()
    }
}

fn capture(state: &VendorState, headers: HeaderMap, query: Option<String>, body: Value) {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_string);
    state.seen.lock().unwrap().push(Captured { authorization, query, headers, body });
}

async fn chat_reply(
    State(state): State<VendorState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    capture(&state, headers, query, body);
    let reply = json!({ "choices": [{ "message": { "role": "assistant", "content": state.reply } }] });
    (state.status, Json(reply))
}

async fn parts_reply(
    State(state): State<VendorState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    capture(&state, headers, query, body);
    let reply = json!({ "candidates": [{ "content": { "parts": [{ "text": state.reply }] } }] });
    (state.status, Json(reply))
}
