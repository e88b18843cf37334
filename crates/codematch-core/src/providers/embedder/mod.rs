use anyhow::Context;
use async_trait::async_trait;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
    fn model_id(&self) -> String;
}

pub mod fake;
pub mod openai;
pub mod titan;

/// Reads an `"embedding"`-style float array out of a provider response.
fn parse_vector(value: Option<&serde_json::Value>, provider: &str) -> anyhow::Result<Vec<f32>> {
    let items = value
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("{} embedding response missing vector", provider))?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let x = item
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("{} embedding contains a non-numeric value", provider))?;
        out.push(x as f32);
    }
    if out.is_empty() {
        anyhow::bail!("{} returned an empty embedding", provider);
    }
    Ok(out)
}

/// Sends `req` and reads the vector at JSON `pointer` in the reply.
pub(crate) async fn fetch_vector(
    req: reqwest::RequestBuilder,
    pointer: &str,
    provider: &str,
) -> anyhow::Result<Vec<f32>> {
    let resp = req
        .send()
        .await
        .with_context(|| format!("{} embedding request failed", provider))?;
    let status = resp.status();
    if !status.is_success() {
        let detail = resp.text().await.unwrap_or_default();
        anyhow::bail!("{} embedding API returned {}: {}", provider, status, detail.trim());
    }
    let body: serde_json::Value = resp
        .json()
        .await
        .with_context(|| format!("{} embedding response is not valid JSON", provider))?;
    let vector = parse_vector(body.pointer(pointer), provider)?;
    tracing::debug!(provider, dims = vector.len(), "embedding received");
    Ok(vector)
}
