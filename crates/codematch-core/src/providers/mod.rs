use crate::config::{resolve_secret, EmbedderConfig, EmbedderKind, GeneratorConfig, GeneratorKind};
use crate::errors::ConfigError;
use std::sync::Arc;

pub mod embedder;
pub mod llm;

use embedder::{fake::FakeEmbedder, openai::OpenAIEmbedder, titan::TitanEmbedder, Embedder};
use llm::{fake::FakeClient, gemini::GeminiClient, openai::OpenAIClient, LlmClient};

/// Builds the configured embedding gateway. Missing credentials fail here,
/// before any work starts.
pub fn build_embedder(cfg: &EmbedderConfig) -> Result<Arc<dyn Embedder>, ConfigError> {
    let embedder: Arc<dyn Embedder> = match cfg.provider {
        EmbedderKind::Titan => {
            let endpoint = cfg.endpoint.clone().ok_or_else(|| {
                ConfigError("embedder.endpoint is required for the titan provider".into())
            })?;
            // titan gateways may be unauthenticated
            let api_key = cfg
                .api_key_env
                .as_deref()
                .and_then(|name| std::env::var(name).ok())
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty());
            Arc::new(TitanEmbedder::new(endpoint, cfg.model.clone(), api_key))
        }
        EmbedderKind::Openai => {
            let env = cfg.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY");
            let key = resolve_secret(env)?;
            let mut e = OpenAIEmbedder::new(cfg.model.clone(), key);
            if let Some(base) = &cfg.endpoint {
                e = e.with_base_url(base.clone());
            }
            Arc::new(e)
        }
        EmbedderKind::Fake => Arc::new(FakeEmbedder::new(&cfg.model, cfg.dims)),
    };
    tracing::debug!(model = %embedder.model_id(), "embedder ready");
    Ok(embedder)
}

pub fn build_generator(cfg: &GeneratorConfig) -> Result<Arc<dyn LlmClient>, ConfigError> {
    let client: Arc<dyn LlmClient> = match cfg.provider {
        GeneratorKind::Gemini => {
            let key = resolve_secret(cfg.api_key_env.as_deref().unwrap_or("GEMINI_API_KEY"))?;
            let mut c = GeminiClient::new(cfg.model.clone(), key, cfg.temperature, cfg.max_tokens);
            if let Some(base) = &cfg.base_url {
                c = c.with_base_url(base.clone());
            }
            Arc::new(c)
        }
        GeneratorKind::Openai => {
            let key = resolve_secret(cfg.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY"))?;
            let mut c = OpenAIClient::new(cfg.model.clone(), key, cfg.temperature, cfg.max_tokens);
            if let Some(base) = &cfg.base_url {
                c = c.with_base_url(base.clone());
            }
            Arc::new(c)
        }
        GeneratorKind::Fake => {
            let reply = cfg.fake_reply.clone().ok_or_else(|| {
                ConfigError("generator.fake_reply is required for the fake provider".into())
            })?;
            Arc::new(FakeClient::new(reply))
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_providers_need_no_credentials() -> anyhow::Result<()> {
        let embedder = build_embedder(&EmbedderConfig {
            provider: EmbedderKind::Fake,
            ..EmbedderConfig::default()
        })?;
        assert!(embedder.model_id().starts_with("fake/"));

        let generator = build_generator(&GeneratorConfig {
            provider: GeneratorKind::Fake,
            fake_reply: Some("def f():\n    return 1".into()),
            ..GeneratorConfig::default()
        })?;
        assert_eq!(generator.provider_name(), "fake");
        Ok(())
    }

    #[test]
    fn missing_generator_key_aborts() {
        let cfg = GeneratorConfig {
            provider: GeneratorKind::Gemini,
            api_key_env: Some("CODEMATCH_TEST_UNSET_GEMINI_KEY".into()),
            ..GeneratorConfig::default()
        };
        let err = build_generator(&cfg).err().expect("build must fail");
        assert!(err.to_string().contains("CODEMATCH_TEST_UNSET_GEMINI_KEY"));
    }

    #[test]
    fn titan_requires_endpoint() {
        let cfg = EmbedderConfig {
            provider: EmbedderKind::Titan,
            endpoint: None,
            ..EmbedderConfig::default()
        };
        assert!(build_embedder(&cfg).is_err());
    }
}
