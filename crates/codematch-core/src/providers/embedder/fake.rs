use super::Embedder;
use crate::embeddings::util::sha256_digest;
use async_trait::async_trait;

/// Offline embedder: hashes identifier-like tokens into a fixed number of
/// signed buckets. Same text always gives the same vector, and texts sharing
/// tokens point in similar directions.
pub struct FakeEmbedder {
    pub model: String,
    pub dims: usize,
}

impl FakeEmbedder {
    pub fn new(model: &str, dims: usize) -> Self {
        Self {
            model: model.to_string(),
            dims: dims.max(1),
        }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|t| !t.is_empty())
        {
            let digest = sha256_digest(&token.to_lowercase());
            let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize
                % self.dims;
            let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn model_id(&self) -> String {
        format!("fake/{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::util::cosine_similarity;

    #[test]
    fn deterministic_and_sized() {
        let e = FakeEmbedder::new("test", 64);
        let a = e.embed_sync("def add(a, b): return a + b");
        assert_eq!(a.len(), 64);
        assert_eq!(a, e.embed_sync("def add(a, b): return a + b"));
    }

    #[test]
    fn token_bags_drive_similarity() -> anyhow::Result<()> {
        let e = FakeEmbedder::new("test", 256);
        let add = e.embed_sync("def add(a, b):\n    return a + b");
        let reordered = e.embed_sync("def add(a, b): return b + a");
        let words = e.embed_sync("the quick brown fox jumps over the lazy dog");
        assert!((cosine_similarity(&add, &reordered)? - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&add, &words)? < 0.9);
        Ok(())
    }
}
