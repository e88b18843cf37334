use std::fmt;

/// Configuration problem that should stop the process before any work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Returns a user-facing diagnostic when `err` is a configuration failure.
pub fn try_map_error(err: &anyhow::Error) -> Option<String> {
    if let Some(cfg) = err.downcast_ref::<ConfigError>() {
        return Some(cfg.to_string());
    }
    let text = err.to_string();
    if text.contains("config error") {
        return Some(text);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_config_errors_only() {
        let e = anyhow::Error::new(ConfigError("GEMINI_API_KEY is not set".into()));
        assert_eq!(
            try_map_error(&e).as_deref(),
            Some("config error: GEMINI_API_KEY is not set")
        );

        let other = anyhow::anyhow!("connection refused");
        assert!(try_map_error(&other).is_none());
    }
}
