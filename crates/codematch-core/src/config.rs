use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_PATH: &str = "codematch.yaml";
pub const DEFAULT_DB_PATH: &str = ".codematch/code_comparison.db";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub database: PathBuf,
    pub embedder: EmbedderConfig,
    pub generator: GeneratorConfig,
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            database: PathBuf::from(DEFAULT_DB_PATH),
            embedder: EmbedderConfig::default(),
            generator: GeneratorConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    Titan,
    Openai,
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedderConfig {
    pub provider: EmbedderKind,
    pub model: String,
    /// Titan-format endpoint URL, or an OpenAI-compatible base URL.
    pub endpoint: Option<String>,
    /// Environment variable holding the credential. Optional for titan.
    pub api_key_env: Option<String>,
    /// Vector size of the fake embedder.
    pub dims: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedderKind::Titan,
            model: crate::providers::embedder::titan::DEFAULT_MODEL.to_string(),
            endpoint: None,
            api_key_env: Some("CODEMATCH_EMBEDDING_API_KEY".to_string()),
            dims: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Gemini,
    Openai,
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub provider: GeneratorKind,
    pub model: String,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Canned reply of the fake generator.
    pub fake_reply: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: GeneratorKind::Gemini,
            model: "gemini-pro".to_string(),
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            base_url: None,
            temperature: 0.2,
            max_tokens: 1024,
            fake_reply: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub top_n: usize,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            timeout_seconds: 60,
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);
    let cfg: AppConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.insert(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML {}: {}", path.display(), e)))?;

    if !ignored_keys.is_empty() {
        tracing::warn!(
            event = "config_unknown_fields",
            file = %path.display(),
            fields = ?ignored_keys,
            "ignoring unknown config fields"
        );
    }

    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Loads `path` when it exists, built-in defaults otherwise.
pub fn load_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(file = %path.display(), "config not found, using defaults");
        Ok(AppConfig::default())
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.top_n == 0 {
            return Err(ConfigError("search.top_n must be at least 1".into()));
        }
        if self.embedder.provider == EmbedderKind::Titan && self.embedder.endpoint.is_none() {
            return Err(ConfigError(
                "embedder.endpoint is required for the titan provider".into(),
            ));
        }
        if self.embedder.provider == EmbedderKind::Fake && self.embedder.dims == 0 {
            return Err(ConfigError("embedder.dims must be at least 1".into()));
        }
        Ok(())
    }

    /// Applies `CODEMATCH_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("CODEMATCH_DB") {
            self.database = PathBuf::from(v);
        }
        if let Some(v) = lookup("CODEMATCH_TOP_N") {
            if let Ok(n) = v.parse::<usize>() {
                if n > 0 {
                    self.search.top_n = n;
                }
            }
        }
    }
}

/// Reads a credential from the environment; a missing or blank value is a
/// configuration error.
pub fn resolve_secret(env_name: &str) -> Result<String, ConfigError> {
    match std::env::var(env_name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError(format!(
            "{} environment variable is not set",
            env_name
        ))),
    }
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

pub const SAMPLE_CONFIG: &str = r#"version: 1
database: .codematch/code_comparison.db

embedder:
  # titan | openai | fake
  provider: fake
  model: amazon.titan-embed-text-v1
  # endpoint: https://bedrock-gateway.example.com/embed
  # api_key_env: CODEMATCH_EMBEDDING_API_KEY
  dims: 256

generator:
  # gemini | openai | fake
  provider: gemini
  model: gemini-pro
  api_key_env: GEMINI_API_KEY
  temperature: 0.2
  max_tokens: 1024

search:
  top_n: 3
  timeout_seconds: 60
"#;
