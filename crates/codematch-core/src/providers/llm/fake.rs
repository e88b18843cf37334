use super::LlmClient;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::sync::Mutex;

/// Returns a fixed reply and records the prompts it was sent.
pub struct FakeClient {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<LlmResponse> {
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        Ok(LlmResponse {
            text: self.reply.clone(),
            provider: "fake".to_string(),
            model: "fake".to_string(),
            meta: serde_json::json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
