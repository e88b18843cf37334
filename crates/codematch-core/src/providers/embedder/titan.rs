use super::{fetch_vector, Embedder};
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_MODEL: &str = "amazon.titan-embed-text-v1";

/// Embedder speaking the Titan text-embedding wire format:
/// `{"inputText": ...}` in, `{"embedding": [...]}` out.
pub struct TitanEmbedder {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl TitanEmbedder {
    pub fn new(endpoint: String, model: String, api_key: Option<String>) -> Self {
        Self {
            endpoint,
            model,
            api_key,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for TitanEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut req = self
            .http
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&json!({ "inputText": text }));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        fetch_vector(req, "/embedding", "titan").await
    }

    fn model_id(&self) -> String {
        format!("titan/{}", self.model)
    }
}
