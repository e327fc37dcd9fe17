mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn users_never_see_each_others_tasks() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.signup("alice@example.com").await?;
    let bob = server.signup("bob@example.com").await?;

    let task = server.create_task(&alice, json!({ "title": "Alice's secret plan" })).await?;
    server.create_task(&bob, json!({ "title": "Bob's chores" })).await?;
    let path = format!("/tasks/{}", task["id"].as_str().unwrap());

    let (_, body) = server.get("/tasks", &bob).await?;
    let titles: Vec<&str> = body["tasks"].as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Bob's chores"]);

    let (_, body) = server.get("/tasks?search=secret", &bob).await?;
    assert!(body["tasks"].as_array().unwrap().is_empty());

    // Foreign tasks answer exactly like missing ones
    let (status, body) = server.get(&path, &bob).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");

    let (status, _) = server.put(&path, &bob, json!({ "title": "Hijacked" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.delete(&path, &bob).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.get(&path, &alice).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "Alice's secret plan");
    Ok(())
}

#[tokio::test]
async fn tasks_record_their_owner() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.signup("carol@example.com").await?;

    let (_, me) = server.get("/auth/me", &token).await?;
    let task = server.create_task(&token, json!({ "title": "Mine", "userId": uuid::Uuid::new_v4() })).await?;

    // A client-supplied owner is ignored
    assert_eq!(task["userId"], me["user"]["id"]);
    Ok(())
}
