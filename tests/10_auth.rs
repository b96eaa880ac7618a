mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{read, TestServer};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = read(server.client.get(server.url("/health")).send().await?).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn root_describes_the_service() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = read(server.client.get(server.url("/")).send().await?).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Viral Quote Engine API");
    Ok(())
}

#[tokio::test]
async fn login_issues_a_verifiable_token() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = read(
        server
            .client
            .post(server.url("/api/auth/login"))
            .json(&json!({"username": "admin", "password": "admin123"}))
            .send()
            .await?,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert_eq!(body["data"]["expiresIn"], 24 * 3600);
    let token = body["data"]["token"].as_str().unwrap_or_default().to_string();

    let (status, body) = read(
        server
            .client
            .post(server.url("/api/auth/verify"))
            .json(&json!({ "token": token }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["user"]["username"], "admin");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = read(
        server
            .client
            .post(server.url("/api/auth/login"))
            .json(&json!({"username": "admin", "password": "not-the-password"}))
            .send()
            .await?,
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert!(body.get("data").is_none());
    Ok(())
}

#[tokio::test]
async fn login_validation_lists_each_field() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = read(
        server
            .client
            .post(server.url("/api/auth/login"))
            .json(&json!({"username": "ab", "password": "123"}))
            .send()
            .await?,
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .map(|d| d.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(fields, vec!["username", "password"]);
    Ok(())
}

#[tokio::test]
async fn protected_routes_distinguish_missing_and_bad_tokens() -> Result<()> {
    let server = TestServer::spawn().await?;
    let body = json!({"text": "A perfectly valid quote", "author": "Someone"});

    let (status, missing) = read(server.client.post(server.url("/api/quotes")).json(&body).send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing["error"]["code"], "AUTH_REQUIRED");

    let (status, bad) = read(
        server
            .client
            .post(server.url("/api/quotes"))
            .bearer_auth("not.a.jwt")
            .json(&body)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad["error"]["code"], "AUTH_ERROR");

    let (status, verify) = read(
        server
            .client
            .post(server.url("/api/auth/verify"))
            .json(&json!({"token": "garbage"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(verify["error"]["code"], "AUTH_ERROR");
    Ok(())
}

#[tokio::test]
async fn me_returns_the_caller_profile() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.user().await?;

    let (status, body) = read(server.client.get(server.url("/api/auth/me")).bearer_auth(&token).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], 2);
    assert_eq!(body["data"]["user"]["username"], "user");
    assert_eq!(body["data"]["user"]["role"], "user");

    let (status, body) = read(server.client.get(server.url("/api/auth/me")).send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

    let (status, body) = read(server.client.get(server.url("/api/auth/me")).bearer_auth("not.a.jwt").send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
    Ok(())
}
