use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::RenderConfig;

use super::storage::{FileStorage, StorageError, StoredFile};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render service is not configured")]
    NotConfigured,

    #[error("render service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("render service responded with status {0}")]
    Status(u16),

    #[error("render service returned an empty image")]
    EmptyImage,

    #[error("failed to store rendered image: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest {
    pub html: String,
    pub width: i64,
    pub height: i64,
}

/// Turns an HTML document into PNG bytes
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn screenshot(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError>;
}

/// Headless-browser screenshot service reached over HTTP.
///
/// The service receives `{html, options: {type, fullPage}, viewport: {width, height}}`
/// and answers with the PNG body.
pub struct HttpRenderer {
    client: reqwest::Client,
    endpoint: Option<String>,
}

#[derive(Serialize)]
struct ScreenshotBody<'a> {
    html: &'a str,
    options: ScreenshotOptions,
    viewport: Viewport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScreenshotOptions {
    #[serde(rename = "type")]
    kind: &'static str,
    full_page: bool,
}

#[derive(Serialize)]
struct Viewport {
    width: i64,
    height: i64,
}

impl HttpRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        if config.service_url.is_none() {
            tracing::warn!("RENDER_SERVICE_URL is not set; /api/render will fail");
        }
        Ok(Self { client, endpoint: config.service_url.clone() })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn screenshot(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        let endpoint = self.endpoint.as_deref().ok_or(RenderError::NotConfigured)?;
        let body = ScreenshotBody {
            html: &request.html,
            options: ScreenshotOptions { kind: "png", full_page: false },
            viewport: Viewport { width: request.width, height: request.height },
        };

        let response = self.client.post(endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(RenderError::Status(response.status().as_u16()));
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(RenderError::EmptyImage);
        }
        Ok(bytes.to_vec())
    }
}

const WATERMARK_STYLE: &str = "<style>.watermark{position:fixed;bottom:10px;right:10px;\
color:rgba(128,128,128,0.7);font-family:Arial,sans-serif;font-size:12px;z-index:9999;\
pointer-events:none;}</style>";

/// Overlay `text` in the bottom-right corner. The block goes before the
/// closing body tag when there is one, otherwise at the end.
pub fn with_watermark(html: &str, text: &str) -> String {
    let block = format!("{}<div class=\"watermark\">{}</div>", WATERMARK_STYLE, escape_html(text));
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(index) => format!("{}{}{}", &html[..index], block, &html[index..]),
        None => format!("{}{}", html, block),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Screenshot the document (watermarked if requested) and persist the PNG
pub async fn render_to_file(
    renderer: &dyn Renderer,
    storage: &FileStorage,
    mut request: RenderRequest,
    watermark: Option<&str>,
) -> Result<StoredFile, RenderError> {
    if let Some(text) = watermark.filter(|t| !t.trim().is_empty()) {
        request.html = with_watermark(&request.html, text);
    }
    let png = renderer.screenshot(&request).await?;
    Ok(storage.save_png(&png).await?)
}
