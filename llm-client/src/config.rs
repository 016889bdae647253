use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LlmError, Result};

/// Provider presets shared by every readalong program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preset used when neither the caller nor `defaults` names one
    #[serde(default = "default_preset")]
    pub default_preset: String,

    /// Per-program default presets (program name -> preset name)
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    /// Named model presets
    #[serde(default)]
    pub presets: HashMap<String, ModelPreset>,

    /// Provider-specific overrides, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_preset() -> String {
    "openai-mini".to_string()
}

/// A named model configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPreset {
    /// Provider identifier (anthropic, openai, openrouter, groq)
    pub provider: String,

    /// Model name as the provider spells it
    pub model: String,
}

impl ModelPreset {
    pub fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (the provider's env var is used when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL, e.g. a local OpenAI-compatible server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Transport-level timeout for a single HTTP request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load from the default location, falling back to built-in presets.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `<config dir>/readalong/llm.toml`
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| LlmError::ConfigError("no user config directory".into()))?;
        Ok(base.join("readalong").join("llm.toml"))
    }

    pub fn get_preset(&self, name: &str) -> Result<&ModelPreset> {
        self.presets
            .get(name)
            .ok_or_else(|| LlmError::InvalidPreset(name.to_string()))
    }

    /// Preset name for `program`, or `default_preset` when it has none.
    pub fn get_default_for_program(&self, program: &str) -> &str {
        self.defaults
            .get(program)
            .map(String::as_str)
            .unwrap_or(&self.default_preset)
    }

    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }
}

impl Default for Config {
    fn default() -> Self {
        let presets = HashMap::from([
            ("openai-mini".to_string(), ModelPreset::new("openai", "gpt-4o-mini")),
            (
                "claude-haiku".to_string(),
                ModelPreset::new("anthropic", "claude-3-5-haiku-latest"),
            ),
            (
                "groq-llama".to_string(),
                ModelPreset::new("groq", "llama-3.3-70b-versatile"),
            ),
        ]);

        Self {
            default_preset: default_preset(),
            defaults: HashMap::new(),
            presets,
            providers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_preset, "openai-mini");

        let preset = config.get_preset("openai-mini").unwrap();
        assert_eq!(preset.provider, "openai");
        assert_eq!(preset.model, "gpt-4o-mini");
        assert!(config.get_preset("claude-haiku").is_ok());
    }

    #[test]
    fn test_invalid_preset() {
        let config = Config::default();
        assert!(matches!(
            config.get_preset("nonexistent"),
            Err(LlmError::InvalidPreset(name)) if name == "nonexistent"
        ));
    }

    #[test]
    fn test_get_default_for_program() {
        let mut config = Config::default();
        assert_eq!(config.get_default_for_program("readalong"), "openai-mini");

        config
            .defaults
            .insert("readalong".to_string(), "groq-llama".to_string());
        assert_eq!(config.get_default_for_program("readalong"), "groq-llama");
        assert_eq!(config.get_default_for_program("other"), "openai-mini");
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_preset, "openai-mini");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("llm.toml");

        let mut config = Config::default();
        config.providers.insert(
            "openai".to_string(),
            ProviderConfig {
                base_url: Some("http://localhost:8080/v1".to_string()),
                request_timeout_secs: Some(20),
                ..ProviderConfig::default()
            },
        );
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        let provider = loaded.get_provider_config("openai").unwrap();
        assert_eq!(provider.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(provider.request_timeout_secs, Some(20));
        assert!(provider.api_key.is_none());
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let toml_str = r#"
[presets.local]
provider = "openai"
model = "qwen2.5"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_preset, "openai-mini");
        assert_eq!(
            config.get_preset("local").unwrap(),
            &ModelPreset::new("openai", "qwen2.5")
        );
    }
}
