use super::LlmClient;
use crate::model::LlmResponse;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const SYSTEM_PROMPT: &str = "You write small, self-contained functions.";

/// OpenAI-compatible chat completions client used as a code generator.
pub struct OpenAIClient {
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
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
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::info!(provider = "openai", model = %self.model, "requesting completion");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("openai request to {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("openai chat returned {}: {}", status, detail.trim());
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .context("openai chat response is not valid JSON")?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("openai chat response has no choices"))?;
        let text = choice
            .message
            .content
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "openai chat reply is empty (finish_reason {:?})",
                    choice.finish_reason
                )
            })?;

        Ok(LlmResponse {
            text,
            provider: self.provider_name().to_string(),
            model: self.model.clone(),
            meta: serde_json::json!({
                "finish_reason": choice.finish_reason,
                "usage": parsed.usage,
            }),
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
