use super::LlmClient;
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiClient {
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<LlmResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens,
            }
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;

        // candidates[0].content.parts[*].text
        let parts = json
            .pointer("/candidates/0/content/parts")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                let reason = json
                    .pointer("/promptFeedback/blockReason")
                    .and_then(|v| v.as_str())
                    .unwrap_or("no candidates");
                anyhow::anyhow!("Gemini API response missing content ({})", reason)
            })?;
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect();

        Ok(LlmResponse {
            text,
            provider: "gemini".to_string(),
            model: self.model.clone(),
            meta: json!({
                "finish_reason": json.pointer("/candidates/0/finishReason").cloned(),
            }),
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
