#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;

use viral_quote_api::config::AppConfig;
use viral_quote_api::database::seed::{seed_global_templates, seed_starter_quotes};
use viral_quote_api::services::{RenderError, RenderRequest, Renderer};
use viral_quote_api::state::AppState;

pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Returns a fixed PNG for any document
pub struct StubRenderer;

#[async_trait]
impl Renderer for StubRenderer {
    async fn screenshot(&self, _request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        Ok(PNG.to_vec())
    }
}

/// Always fails, like an unreachable screenshot service
pub struct DownRenderer;

#[async_trait]
impl Renderer for DownRenderer {
    async fn screenshot(&self, _request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Status(502))
    }
}

/// An app instance on its own port with in-memory stores
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub render_dir: TempDir,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(Arc::new(StubRenderer)).await
    }

    pub async fn spawn_with(renderer: Arc<dyn Renderer>) -> Result<Self> {
        Self::start(renderer, false).await
    }

    /// Like `spawn`, with the starter quote catalogue installed as on a fresh deployment
    pub async fn spawn_with_starter_quotes() -> Result<Self> {
        Self::start(Arc::new(StubRenderer), true).await
    }

    async fn start(renderer: Arc<dyn Renderer>, starter_quotes: bool) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let render_dir = tempfile::tempdir()?;

        let mut config = AppConfig::development();
        config.storage.render_dir = render_dir.path().to_path_buf();
        config.storage.public_base_url = base_url.clone();

        let state = AppState::in_memory(config, renderer)?;
        seed_global_templates(state.templates.as_ref()).await?;
        if starter_quotes {
            seed_starter_quotes(state.quotes.as_ref()).await?;
        }
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, viral_quote_api::app(state)).await;
        });

        let server = Self { port, base_url, client: reqwest::Client::new(), render_dir };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["token"].as_str().map(str::to_string).context("missing token")
    }

    /// Token for the seeded administrator (id 1)
    pub async fn admin(&self) -> Result<String> {
        self.login("admin", "admin123").await
    }

    /// Token for the seeded regular user (id 2)
    pub async fn user(&self) -> Result<String> {
        self.login("user", "user123").await
    }

    pub async fn create_quote(&self, token: &str, text: &str, author: &str, category: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/quotes"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "text": text, "author": author, "category": category }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}

/// Status plus parsed JSON body
pub async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await?;
    Ok((status, body))
}
