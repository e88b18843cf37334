use anyhow::Context;
use sha2::{Digest, Sha256};

/// Stored form of an embedding: a JSON array of floats.
pub fn encode_vec_json(v: &[f32]) -> anyhow::Result<String> {
    serde_json::to_string(v).context("failed to encode embedding")
}

pub fn decode_vec_json(text: &str) -> anyhow::Result<Vec<f32>> {
    serde_json::from_str(text).context("stored embedding is not a JSON float array")
}

pub fn sha256_digest(s: &str) -> [u8; 32] {
    Sha256::digest(s.as_bytes()).into()
}

/// Cosine similarity of two equal-length vectors, accumulated in f64.
/// A zero-norm side scores 0.0 instead of NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> anyhow::Result<f64> {
    anyhow::ensure!(
        a.len() == b.len(),
        "embedding dims mismatch (query={}, stored={})",
        a.len(),
        b.len()
    );

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f64, 0.0f64, 0.0f64), |(d, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (d + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
