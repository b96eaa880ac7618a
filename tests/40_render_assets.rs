mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{read, DownRenderer, TestServer, PNG};

async fn render(server: &TestServer, token: &str, body: Value) -> Result<(StatusCode, Value)> {
    read(server.client.post(server.url("/api/render")).bearer_auth(token).json(&body).send().await?).await
}

#[tokio::test]
async fn render_stores_png_and_records_asset() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;

    let (status, body) = render(&server, &user, json!({"html": "<h1>Hello</h1>", "width": 1080, "height": 1080})).await?;
    assert_eq!(status, StatusCode::CREATED);
    let image_url = body["data"]["imageUrl"].as_str().unwrap_or_default().to_string();
    assert!(image_url.starts_with(&format!("{}/renders/render_", server.base_url)));
    assert_eq!(body["data"]["asset"]["url"], image_url.as_str());
    assert_eq!(body["data"]["asset"]["userId"], 2);
    assert_eq!(body["data"]["asset"]["width"], 1080);

    // the stored file is served back
    let served = server.client.get(&image_url).send().await?;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await?.as_ref(), PNG);

    let (_, listed) = read(server.client.get(server.url("/api/assets?userId=2")).send().await?).await?;
    assert_eq!(listed["meta"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn render_validation() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;

    let (status, body) = render(&server, &user, json!({"html": "   ", "width": 0, "height": 5000})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"].as_array().map(Vec::len), Some(3));

    let (status, body) = render(&server, &user, json!({"html": "<p>x</p>", "width": 10, "height": 10, "templateId": 999})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TEMPLATE_NOT_FOUND");

    let (status, body) =
        read(server.client.post(server.url("/api/render")).json(&json!({"html": "<p>x</p>"})).send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn renderer_failure_is_render_failed() -> Result<()> {
    let server = TestServer::spawn_with(Arc::new(DownRenderer)).await?;
    let user = server.user().await?;

    let (status, body) = render(&server, &user, json!({"html": "<p>x</p>", "width": 10, "height": 10})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "RENDER_FAILED");

    let (_, assets) = read(server.client.get(server.url("/api/assets")).send().await?).await?;
    assert_eq!(assets["meta"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn deleting_an_asset_removes_its_file() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let admin = server.admin().await?;
    let (_, body) = render(&server, &user, json!({"html": "<p>x</p>", "width": 10, "height": 10})).await?;
    let id = body["data"]["asset"]["id"].clone();
    let image_url = body["data"]["imageUrl"].as_str().unwrap_or_default().to_string();
    let filename = image_url.rsplit('/').next().unwrap_or_default().to_string();
    assert!(server.render_dir.path().join(&filename).exists());

    let url = server.url(&format!("/api/assets/{}", id));
    let (status, _) = read(server.client.get(&url).send().await?).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = read(server.client.delete(&url).send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

    let (status, body) = read(server.client.delete(&url).bearer_auth(&admin).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Asset deleted successfully");
    assert!(!server.render_dir.path().join(&filename).exists());

    let (status, body) = read(server.client.get(&url).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ASSET_NOT_FOUND");

    let (status, _) = read(server.client.get(&image_url).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn failed_file_cleanup_still_deletes_the_asset() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let (_, body) = render(&server, &user, json!({"html": "<p>x</p>", "width": 10, "height": 10})).await?;
    let image_url = body["data"]["imageUrl"].as_str().unwrap_or_default().to_string();
    let filename = image_url.rsplit('/').next().unwrap_or_default().to_string();

    // a non-empty directory where the render file was makes removal fail
    let path = server.render_dir.path().join(&filename);
    std::fs::remove_file(&path)?;
    std::fs::create_dir(&path)?;
    std::fs::write(path.join("keep"), b"x")?;

    let url = server.url(&format!("/api/assets/{}", body["data"]["asset"]["id"]));
    let (status, deleted) = read(server.client.delete(&url).bearer_auth(&user).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"data": {"message": "Asset deleted successfully"}}));

    let (status, body) = read(server.client.get(&url).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ASSET_NOT_FOUND");
    assert!(path.is_dir());
    Ok(())
}

#[tokio::test]
async fn users_cannot_delete_foreign_assets() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let admin = server.admin().await?;
    let (_, body) = render(&server, &admin, json!({"html": "<p>x</p>", "width": 10, "height": 10})).await?;
    let url = server.url(&format!("/api/assets/{}", body["data"]["asset"]["id"]));

    let (status, body) = read(server.client.delete(&url).bearer_auth(&user).send().await?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, body) = read(server.client.get(server.url("/api/assets?templateId=x")).send().await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "templateId");
    Ok(())
}

#[tokio::test]
async fn rewrite_returns_variants_or_422() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = read(
        server.client.post(server.url("/api/ai/rewrite")).json(&json!({"text": "Dream big", "style": "bold"})).send().await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let variants = body["data"]["variants"].as_array().cloned().unwrap_or_default();
    assert!(variants.len() >= 3);
    assert!(variants.iter().all(|v| v.as_str().map(|s| s.to_lowercase().contains("dream big")).unwrap_or(false)));

    let (status, body) =
        read(server.client.post(server.url("/api/ai/rewrite")).json(&json!({"text": "   "})).send().await?).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let long = "x".repeat(201);
    let (status, _) =
        read(server.client.post(server.url("/api/ai/rewrite")).json(&json!({"text": long})).send().await?).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

fn logo_form(bytes: Vec<u8>, mime: &str) -> Result<reqwest::multipart::Form> {
    let part = reqwest::multipart::Part::bytes(bytes).file_name("logo.png").mime_str(mime)?;
    Ok(reqwest::multipart::Form::new().part("logo", part))
}

#[tokio::test]
async fn logo_upload_stores_an_image_for_the_brand_kit() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let upload = server.url("/api/upload/logo");

    let (status, body) =
        read(server.client.post(&upload).bearer_auth(&user).multipart(logo_form(PNG.to_vec(), "image/png")?).send().await?)
            .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["mimeType"], "image/png");
    assert_eq!(body["data"]["size"], PNG.len());
    let logo_url = body["data"]["url"].as_str().unwrap_or_default().to_string();
    assert!(logo_url.starts_with(&format!("{}/renders/logo_", server.base_url)));
    assert!(logo_url.ends_with(".png"));

    let served = server.client.get(&logo_url).send().await?;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await?.as_ref(), PNG);

    let kit = json!({
        "primaryColor": "#111111",
        "secondaryColor": "#222222",
        "accentColor": "#333333",
        "fontFamily": "Inter",
        "logoUrl": logo_url
    });
    let (status, body) =
        read(server.client.put(server.url("/api/brand-kit")).bearer_auth(&user).json(&kit).send().await?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["logoUrl"], logo_url.as_str());
    Ok(())
}

#[tokio::test]
async fn logo_upload_rejects_bad_files() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user().await?;
    let upload = server.url("/api/upload/logo");

    let (status, body) =
        read(server.client.post(&upload).multipart(logo_form(PNG.to_vec(), "image/png")?).send().await?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");

    let (status, body) = read(
        server.client.post(&upload).bearer_auth(&user).multipart(logo_form(b"%PDF-1.4".to_vec(), "application/pdf")?).send().await?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "logo");

    let oversized = vec![0u8; 2 * 1024 * 1024 + 1];
    let (status, body) =
        read(server.client.post(&upload).bearer_auth(&user).multipart(logo_form(oversized, "image/png")?).send().await?)
            .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "logo");

    let empty_form = reqwest::multipart::Form::new().text("note", "no file here");
    let (status, body) = read(server.client.post(&upload).bearer_auth(&user).multipart(empty_form).send().await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["message"], "Logo file is required");

    let (status, body) =
        read(server.client.post(&upload).bearer_auth(&user).json(&json!({"logo": "x"})).send().await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "logo");

    let uploaded = std::fs::read_dir(server.render_dir.path())?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("logo_"))
        .count();
    assert_eq!(uploaded, 0);
    Ok(())
}
