use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AiConfig;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion service responded with status {0}")]
    Status(u16),

    #[error("completion response had no content")]
    Empty,
}

/// A text-completion backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// OpenAI-compatible chat completions endpoint
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: 500,
        };
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CompletionError::Status(response.status().as_u16()));
        }
        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::Empty)
    }
}

/// Produces viral rewrites of a short text. Falls back to canned variants
/// when no completion backend is configured or the backend fails.
#[derive(Clone)]
pub struct Rewriter {
    client: Option<Arc<dyn CompletionClient>>,
}

impl Rewriter {
    pub fn new(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.is_empty()) else {
            tracing::info!("OPENAI_API_KEY not set; AI rewrite uses mock variants");
            return Self::new(None);
        };
        match OpenAiClient::new(config, api_key) {
            Ok(client) => Self::new(Some(Arc::new(client))),
            Err(e) => {
                tracing::warn!("Failed to build completion client, using mock variants: {}", e);
                Self::new(None)
            }
        }
    }

    pub async fn rewrite(&self, text: &str, style: Option<&str>) -> Vec<String> {
        let Some(client) = &self.client else {
            return mock_variants(text);
        };
        match client.complete(&build_prompt(text, style)).await {
            Ok(reply) => parse_variants(&reply).unwrap_or_else(|| {
                tracing::warn!("Completion returned fewer than 3 variants, using mock variants");
                mock_variants(text)
            }),
            Err(e) => {
                tracing::error!("Completion service error: {}", e);
                mock_variants(text)
            }
        }
    }
}

fn build_prompt(text: &str, style: Option<&str>) -> String {
    let mut prompt = format!(
        "Rewrite the following text in 3-5 punchy, viral variations. Make them engaging and shareable. \
         Return only the variations, one per line, numbered:\n\nOriginal: \"{}\"",
        text
    );
    if let Some(style) = style.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("\nStyle: {}", style));
    }
    prompt
}

/// One variant per non-empty line, `1.`-style numbering removed. `None`
/// when fewer than three survive.
fn parse_variants(reply: &str) -> Option<Vec<String>> {
    let variants: Vec<String> = reply
        .lines()
        .map(|line| strip_numbering(line.trim()))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    (variants.len() >= 3).then_some(variants)
}

fn strip_numbering(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix('.') {
            return rest.trim_start();
        }
    }
    line
}

fn mock_variants(text: &str) -> Vec<String> {
    vec![
        format!("💥 {} - but make it VIRAL!", text),
        format!("🔥 Hot take: {}", text.to_lowercase()),
        format!("✨ Plot twist: {}", text),
        format!("🚀 Breaking: {}", text),
        format!("💎 Golden truth: {}", text),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Result<&'static str, ()>);

    #[async_trait]
    impl CompletionClient for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            self.0.map(str::to_string).map_err(|_| CompletionError::Empty)
        }
    }

    fn rewriter(reply: Result<&'static str, ()>) -> Rewriter {
        Rewriter::new(Some(Arc::new(Canned(reply))))
    }

    #[test]
    fn prompt_includes_style_when_given() {
        assert!(build_prompt("Be bold", Some("funny")).ends_with("Original: \"Be bold\"\nStyle: funny"));
        assert!(!build_prompt("Be bold", Some("  ")).contains("Style:"));
    }

    #[test]
    fn numbering_is_stripped() {
        let parsed = parse_variants("1. First\n\n2.Second\n10. Tenth\nplain line").unwrap();
        assert_eq!(parsed, vec!["First", "Second", "Tenth", "plain line"]);
        assert_eq!(strip_numbering("2024 was great"), "2024 was great");
        assert!(parse_variants("1. only\n2. two").is_none());
    }

    #[tokio::test]
    async fn without_client_mock_variants_are_returned() {
        let variants = Rewriter::new(None).rewrite("Dream Big", None).await;
        assert_eq!(variants.len(), 5);
        assert!(variants.iter().all(|v| v.contains("Dream Big") || v.contains("dream big")));
    }

    #[tokio::test]
    async fn falls_back_on_failure_or_short_reply() {
        assert_eq!(rewriter(Err(())).rewrite("Go", None).await, mock_variants("Go"));
        assert_eq!(rewriter(Ok("1. just one")).rewrite("Go", None).await, mock_variants("Go"));
        assert_eq!(rewriter(Ok("1. a\n2. b\n3. c")).rewrite("Go", None).await, vec!["a", "b", "c"]);
    }
}
