//! Client configuration from the environment.

use std::env;

use tracing::info;

pub const API_URL_VAR: &str = "LCA_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `LCA_API_URL`, falling back to the local PostgREST default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(base_url) => Self { base_url },
            None => {
                info!("{API_URL_VAR} not set, using default: {DEFAULT_API_URL}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_uses_default() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn blank_var_uses_default() {
        let config = ClientConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn var_overrides_default() {
        let config = ClientConfig::from_lookup(|key| {
            (key == API_URL_VAR).then(|| "https://api.example.org".to_string())
        });
        assert_eq!(config.base_url, "https://api.example.org");
    }
}
