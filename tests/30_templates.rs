mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{read, TestServer};

async fn create_template(server: &TestServer, token: &str, name: &str) -> Result<Value> {
    let (status, body) = read(
        server
            .client
            .post(server.url("/api/templates"))
            .bearer_auth(token)
            .json(&json!({"name": name, "config": {"background": "#000"}}))
            .send()
            .await?,
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "create failed: {} {}", status, body);
    Ok(body["data"].clone())
}

#[tokio::test]
async fn global_scope_is_the_default() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.user().await?;
    create_template(&server, &token, "My private one").await?;

    let (status, body) = read(server.client.get(server.url("/api/templates")).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);
    let items = body["data"].as_array().cloned().unwrap_or_default();
    assert!(items.iter().all(|t| t["userId"].is_null()));

    let (_, explicit) = read(server.client.get(server.url("/api/templates?scope=global")).send().await?).await?;
    assert_eq!(explicit["meta"], body["meta"]);
    Ok(())
}

#[tokio::test]
async fn mine_scope_requires_auth_and_filters_by_owner() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let admin = server.admin().await?;
    create_template(&server, &user, "User template").await?;
    create_template(&server, &admin, "Admin template").await?;

    let (status, body) = read(server.client.get(server.url("/api/templates?scope=mine")).send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

    let (status, body) =
        read(server.client.get(server.url("/api/templates?scope=mine")).bearer_auth(&user).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "User template");
    assert_eq!(body["data"][0]["userId"], 2);
    Ok(())
}

#[tokio::test]
async fn unknown_scope_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = read(server.client.get(server.url("/api/templates?scope=everyone")).send().await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_SCOPE");
    Ok(())
}

#[tokio::test]
async fn global_templates_are_read_only_to_users() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let (_, globals) = read(server.client.get(server.url("/api/templates?limit=1")).send().await?).await?;
    let id = globals["data"][0]["id"].clone();
    let url = server.url(&format!("/api/templates/{}", id));

    let (status, body) =
        read(server.client.put(&url).bearer_auth(&user).json(&json!({"name": "Hijacked"})).send().await?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "READONLY_TEMPLATE");

    let (status, body) = read(server.client.delete(&url).bearer_auth(&user).send().await?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "READONLY_TEMPLATE");

    let admin = server.admin().await?;
    let (status, body) =
        read(server.client.put(&url).bearer_auth(&admin).json(&json!({"name": "Renamed"})).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");
    Ok(())
}

#[tokio::test]
async fn owners_update_and_delete_their_templates() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let template = create_template(&server, &user, "Draft").await?;
    let url = server.url(&format!("/api/templates/{}", template["id"]));

    let (status, body) = read(
        server
            .client
            .put(&url)
            .bearer_auth(&user)
            .json(&json!({"config": {"background": "#fff", "font_size": "24px"}}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Draft");
    assert_eq!(body["data"]["config"]["font_size"], "24px");

    let (status, body) = read(server.client.delete(&url).bearer_auth(&user).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Template deleted successfully");

    let (status, body) = read(server.client.delete(&url).bearer_auth(&user).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TEMPLATE_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn template_config_must_be_an_object() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let (status, body) = read(
        server
            .client
            .post(server.url("/api/templates"))
            .bearer_auth(&user)
            .json(&json!({"name": "", "config": "blue"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn brand_kit_upsert_and_access() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let kit = json!({
        "primaryColor": "#111111",
        "secondaryColor": "#222222",
        "accentColor": "#ff6b6b",
        "fontFamily": "Inter",
        "watermarkText": "@quotes"
    });

    let (status, body) = read(server.client.get(server.url("/api/brand-kit")).bearer_auth(&user).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "BRAND_KIT_NOT_FOUND");

    let (status, created) =
        read(server.client.put(server.url("/api/brand-kit")).bearer_auth(&user).json(&kit).send().await?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["userId"], 2);
    assert!(created["data"]["logoUrl"].is_null());

    let mut changed = kit.clone();
    changed["fontFamily"] = json!("Roboto");
    let (status, updated) =
        read(server.client.put(server.url("/api/brand-kit")).bearer_auth(&user).json(&changed).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["id"], created["data"]["id"]);
    assert_eq!(updated["data"]["fontFamily"], "Roboto");

    let (status, body) = read(
        server.client.get(server.url("/api/brand-kit?userId=1")).bearer_auth(&user).send().await?,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let admin = server.admin().await?;
    let (status, body) = read(
        server.client.get(server.url("/api/brand-kit?userId=2")).bearer_auth(&admin).send().await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fontFamily"], "Roboto");

    let (status, body) = read(
        server
            .client
            .put(server.url("/api/brand-kit"))
            .bearer_auth(&user)
            .json(&json!({"primaryColor": "#000"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn concurrent_first_brand_kit_puts_create_one_kit() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;

    let mut tasks = Vec::new();
    for n in 0..8 {
        let client = server.client.clone();
        let url = server.url("/api/brand-kit");
        let token = user.clone();
        tasks.push(tokio::spawn(async move {
            let kit = json!({
                "primaryColor": format!("#00000{}", n),
                "secondaryColor": "#222222",
                "accentColor": "#ff6b6b",
                "fontFamily": "Inter"
            });
            client.put(url).bearer_auth(token).json(&kit).send().await.map(|res| res.status())
        }));
    }

    let mut statuses = Vec::new();
    for task in tasks {
        statuses.push(task.await??);
    }
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 7);

    let (status, body) = read(server.client.get(server.url("/api/brand-kit")).bearer_auth(&user).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], 2);
    Ok(())
}
