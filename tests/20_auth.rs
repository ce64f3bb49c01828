mod common;

use anyhow::Result;
use reqwest::StatusCode;
use mysql_mcp_gateway::testing::FakeConnector;
use serde_json::{json, Value};

fn list_body() -> Value {
    json!({"mcp_request": {"verb": "list_resources"}})
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let server = common::spawn_server(FakeConnector::new()).await?;

    let res = reqwest::Client::new()
        .post(server.url("/query"))
        .json(&list_body())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?, json!({"detail": "Invalid API key"}));
    assert_eq!(server.db.opened(), 0);
    Ok(())
}

#[tokio::test]
async fn wrong_token_is_unauthorized() -> Result<()> {
    let server = common::spawn_server(FakeConnector::new()).await?;

    let res = reqwest::Client::new()
        .post(server.url("/query"))
        .bearer_auth("not-the-key")
        .json(&list_body())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.db.opened(), 0);
    Ok(())
}

#[tokio::test]
async fn padded_token_is_unauthorized() -> Result<()> {
    let server = common::spawn_server(FakeConnector::new()).await?;

    let res = reqwest::Client::new()
        .post(server.url("/query"))
        .header("authorization", format!("Bearer  {}", common::API_KEY))
        .json(&list_body())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.db.opened(), 0);
    Ok(())
}

#[tokio::test]
async fn auth_is_checked_before_body() -> Result<()> {
    let server = common::spawn_server(FakeConnector::new()).await?;

    let res = reqwest::Client::new()
        .post(server.url("/query"))
        .header("content-type", "application/json")
        .body("this is not json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_body_with_valid_token_is_unprocessable() -> Result<()> {
    let server = common::spawn_server(FakeConnector::new()).await?;

    let res = reqwest::Client::new()
        .post(server.url("/query"))
        .bearer_auth(common::API_KEY)
        .json(&json!({"verb": "list_resources"}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert!(body["detail"].is_string(), "missing detail: {}", body);
    assert_eq!(server.db.opened(), 0);
    Ok(())
}
