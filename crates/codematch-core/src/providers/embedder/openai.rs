use super::{fetch_vector, Embedder};
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI-compatible `/v1/embeddings` endpoint; one input per request.
pub struct OpenAIEmbedder {
    model: String,
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAIEmbedder {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
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
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let req = self
            .http
            .post(format!("{}/v1/embeddings", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "input": [text] }));
        fetch_vector(req, "/data/0/embedding", "openai").await
    }

    fn model_id(&self) -> String {
        format!("openai/{}", self.model)
    }
}
