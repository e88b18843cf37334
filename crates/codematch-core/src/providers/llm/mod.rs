use crate::model::LlmResponse;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<LlmResponse>;
    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod gemini;
pub mod openai;

/// Appended to every generation prompt so the reply is directly executable.
pub const CODE_ONLY_INSTRUCTION: &str = "\n\nRespond with the source of a single Python function \
that solves the task, and nothing else: no explanation, no usage example, no imports, no classes. \
Use plain loops and builtins (no while loops, no recursion, no generator expressions).";

/// Asks `client` for a function implementing `prompt` and returns its source
/// with any markdown fences removed.
pub async fn generate_code(client: &dyn LlmClient, prompt: &str) -> anyhow::Result<String> {
    let request = format!("{}{}", prompt.trim(), CODE_ONLY_INSTRUCTION);
    let resp = client.complete(&request).await?;
    let code = strip_code_fences(&resp.text);
    if code.is_empty() {
        anyhow::bail!(
            "{} returned no code for the prompt",
            client.provider_name()
        );
    }
    tracing::info!(
        provider = client.provider_name(),
        model = %resp.model,
        chars = code.len(),
        "candidate code generated"
    );
    Ok(code)
}

/// Returns the body of the first fenced block, or the trimmed text when the
/// reply is not fenced.
pub fn strip_code_fences(text: &str) -> String {
    static FENCED: OnceLock<Regex> = OnceLock::new();
    let re = FENCED.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").expect("fence pattern is valid")
    });

    if let Some(body) = re.captures(text).and_then(|c| c.get(1)) {
        return body.as_str().trim().to_string();
    }

    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        // unterminated fence: drop the opening line
        Some(rest) => rest
            .split_once('\n')
            .map(|(_, body)| body)
            .unwrap_or("")
            .trim()
            .to_string(),
        None => trimmed.to_string(),
    }
}
