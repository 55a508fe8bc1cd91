use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const BIND_ADDRESS_ENV: &str = "BIND_ADDRESS";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Upper bound on an inbound update body; larger bodies count as unreadable.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

impl Config {
    /// Bot token with empty values treated as unset.
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Load from `path` if it exists, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(BOT_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(addr) = lookup(BIND_ADDRESS_ENV).filter(|a| !a.is_empty()) {
            self.server.bind_address = addr;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert_eq!(config.server.max_body_bytes, 1024 * 1024);
        assert_eq!(config.telegram.api_base_url, "https://api.telegram.org");
        assert!(config.bot_token().is_none());
    }

    #[test]
    fn test_file_values_parsed() {
        let config = Config::parse(
            r#"
[server]
bind_address = "127.0.0.1:8080"
max_body_bytes = 4096

[telegram]
bot_token = "123:abc"
api_base_url = "http://localhost:9000"
"#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.server.max_body_bytes, 4096);
        assert_eq!(config.bot_token(), Some("123:abc"));
        assert_eq!(config.telegram.api_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_env_token_overrides_file() {
        let mut config = Config::parse("[telegram]\nbot_token = \"from-file\"").unwrap();
        config.apply_overrides(env(&[(BOT_TOKEN_ENV, "from-env")]));
        assert_eq!(config.bot_token(), Some("from-env"));
    }

    #[test]
    fn test_empty_env_token_keeps_file_value() {
        let mut config = Config::parse("[telegram]\nbot_token = \"from-file\"").unwrap();
        config.apply_overrides(env(&[(BOT_TOKEN_ENV, "")]));
        assert_eq!(config.bot_token(), Some("from-file"));
    }

    #[test]
    fn test_blank_token_treated_as_unset() {
        let config = Config::parse("[telegram]\nbot_token = \"  \"").unwrap();
        assert!(config.bot_token().is_none());
    }

    #[test]
    fn test_bind_address_override() {
        let mut config = Config::default();
        config.apply_overrides(env(&[(BIND_ADDRESS_ENV, "127.0.0.1:1234")]));
        assert_eq!(config.server.bind_address, "127.0.0.1:1234");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/vercel-bot.toml")).unwrap();
        assert_eq!(config.server.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::parse("[server\nbind_address = 1").is_err());
    }
}
