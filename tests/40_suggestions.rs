mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{FakeVendor, TestServer};

fn titles(body: &Value) -> Vec<String> {
    body["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn chat_vendor_suggestions_are_capped() -> Result<()> {
    let items: Vec<Value> = (1..=7)
        .map(|i| json!({ "title": format!("Idea {}", i), "description": "d", "priority": "High", "tags": ["x"] }))
        .collect();
    let vendor = FakeVendor::spawn(&format!("Here you go:\n{}", Value::Array(items))).await?;
    let mut genai = vendor.config("chat", "/chat");
    genai.extra_headers.insert("X-Team".to_string(), "planning".to_string());
    let server = TestServer::spawn_with(genai).await?;
    let token = server.signup("ideas@example.com").await?;
    server.create_task(&token, json!({ "title": "Prepare project meeting", "tags": ["work"] })).await?;

    let (status, body) = server.get("/tasks/ai/suggestions?context=new%20job", &token).await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(titles(&body), vec!["Idea 1", "Idea 2", "Idea 3", "Idea 4", "Idea 5"]);
    assert_eq!(body["suggestions"][0]["priority"], "high");
    assert_eq!(body["suggestions"][0]["tags"], json!(["x"]));

    let requests = vendor.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.authorization.as_deref(), Some("Bearer test-key"));
    assert_eq!(request.headers.get("x-team").and_then(|v| v.to_str().ok()), Some("planning"));
    assert_eq!(request.body["model"], "gpt-3.5-turbo");
    assert_eq!(request.body["temperature"], 0.7);
    assert_eq!(request.body["max_tokens"], 1000);
    assert_eq!(request.body["messages"][0]["role"], "system");
    let prompt = request.body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("- Prepare project meeting [work]"), "prompt: {}", prompt);
    assert!(prompt.contains("User context: new job"), "prompt: {}", prompt);
    Ok(())
}

#[tokio::test]
async fn parts_vendor_passes_key_in_query() -> Result<()> {
    let vendor = FakeVendor::spawn(r#"[{"task": "Stretch", "desc": "Ten minutes"}]"#).await?;
    let server = TestServer::spawn_with(vendor.config("gemini", "/parts")).await?;
    let token = server.signup("parts@example.com").await?;

    let (status, body) = server.get("/tasks/ai/suggestions", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Stretch"]);
    assert_eq!(body["suggestions"][0]["description"], "Ten minutes");
    assert_eq!(body["suggestions"][0]["priority"], "medium");

    let requests = vendor.requests();
    assert_eq!(requests[0].query.as_deref(), Some("key=test-key"));
    assert!(requests[0].authorization.is_none());
    assert!(requests[0].body["contents"][0]["parts"][0]["text"].as_str().unwrap().contains("task management assistant"));
    Ok(())
}

#[tokio::test]
async fn unparseable_reply_falls_back() -> Result<()> {
    let vendor = FakeVendor::spawn("Sorry, I am not able to help with that.").await?;
    let server = TestServer::spawn_with(vendor.config("chat", "/chat")).await?;
    let token = server.signup("fallback@example.com").await?;
    server.create_task(&token, json!({ "title": "Finish project deadline" })).await?;
    server.create_task(&token, json!({ "title": "Family dinner at home" })).await?;

    let (status, body) = server.get("/tasks/ai/suggestions", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&body),
        vec!["Review weekly goals", "Schedule personal time", "Review and prioritize tasks"]
    );
    Ok(())
}

#[tokio::test]
async fn vendor_errors_fall_back() -> Result<()> {
    let vendor = FakeVendor::spawn_with_status(StatusCode::INTERNAL_SERVER_ERROR, "boom").await?;
    let server = TestServer::spawn_with(vendor.config("chat", "/chat")).await?;
    let token = server.signup("errors@example.com").await?;

    let (status, body) = server.get("/tasks/ai/suggestions", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Review and prioritize tasks"]);
    assert_eq!(vendor.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_api_key_falls_back_without_calling_out() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.signup("nokey@example.com").await?;

    let (status, body) = server.get("/tasks/ai/suggestions", &token).await?;
    assert_eq!(status, StatusCode::OK);
    let suggestions = body["suggestions"].as_array().unwrap();
    assert!(!suggestions.is_empty() && suggestions.len() <= 3);
    Ok(())
}

#[tokio::test]
async fn categorize_uses_vendor_then_keywords() -> Result<()> {
    let vendor = FakeVendor::spawn(r#"Sure: {"tags": ["errand", "outdoors"], "priority": "LOW"}"#).await?;
    let server = TestServer::spawn_with(vendor.config("chat", "/chat")).await?;
    let token = server.signup("cat@example.com").await?;

    let request = json!({ "title": "Mail the package", "description": "post office closes at 5" });
    let (status, body) = server.post("/tasks/ai/categorize", &token, request).await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["categorization"], json!({ "tags": ["errand", "outdoors"], "priority": "low" }));

    let prompt = vendor.requests()[0].body["messages"][1]["content"].as_str().unwrap().to_string();
    assert!(prompt.contains("Mail the package"));

    // Without a vendor the keyword rules answer
    let offline = TestServer::spawn().await?;
    let token = offline.signup("cat@example.com").await?;
    let request = json!({ "title": "URGENT: buy printer ink", "description": "for the office" });
    let (status, body) = offline.post("/tasks/ai/categorize", &token, request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categorization"]["priority"], "high");
    assert_eq!(body["categorization"]["tags"], json!(["urgent", "work", "shopping"]));
    Ok(())
}

#[tokio::test]
async fn categorize_requires_title() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.signup("cat@example.com").await?;

    let (status, body) = server.post("/tasks/ai/categorize", &token, json!({ "description": "no title" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fieldErrors"]["title"], "Title is required");

    let (status, _) = server.send(Method::POST, "/tasks/ai/categorize", None, Some(json!({ "title": "x" }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
