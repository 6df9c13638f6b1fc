use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the chat-completions endpoint, e.g. "https://api.cerebras.ai/v1"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Hard per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.cerebras.ai/v1".to_string()
}

fn default_model() -> String {
    "llama3.1-70b".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> usize {
    4000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Whether data calls resolve against mock templates or live endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    Mock,
    Real,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_mode")]
    pub mode: DataMode,
    /// Directory holding mock response templates (`<op-id>.json` with '/'
    /// flattened to '-')
    #[serde(default = "default_mock_dir")]
    pub mock_dir: PathBuf,
}

fn default_data_mode() -> DataMode {
    DataMode::Mock
}

fn default_mock_dir() -> PathBuf {
    PathBuf::from("mock-data")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            mode: default_data_mode(),
            mock_dir: default_mock_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_registry_dir")]
    pub registry_dir: PathBuf,
    /// Shortlist size handed to the planner (5-10 is the useful range).
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_registry_dir() -> PathBuf {
    PathBuf::from("registry")
}

fn default_top_k() -> usize {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            registry_dir: default_registry_dir(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("cardflow").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("CARDFLOW_API_KEY") {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("CARDFLOW_BASE_URL") {
            if !url.is_empty() {
                self.llm.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("CARDFLOW_MODEL") {
            if !model.is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(mode) = std::env::var("CARDFLOW_DATA_MODE") {
            match mode.to_lowercase().as_str() {
                "mock" => self.data.mode = DataMode::Mock,
                "real" => self.data.mode = DataMode::Real,
                other => tracing::warn!("Unknown CARDFLOW_DATA_MODE '{}', keeping config", other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.model, "llama3.1-70b");
        assert_eq!(config.llm.max_tokens, 4000);
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.data.mode, DataMode::Mock);
        assert_eq!(config.catalog.top_k, 10);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.llm.base_url, config.llm.base_url);
        assert_eq!(parsed.data.mode, config.data.mode);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: Config = toml::from_str("[llm]\nmodel = \"qwen-3-32b\"\n").unwrap();
        assert_eq!(parsed.llm.model, "qwen-3-32b");
        assert_eq!(parsed.llm.max_tokens, 4000);
        assert_eq!(parsed.server.host, "127.0.0.1");
    }
}
