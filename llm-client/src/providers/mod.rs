//! LLM provider implementations

mod anthropic;
mod http;
pub mod mock;
mod openai_compatible;

pub use anthropic::AnthropicProvider;
pub use mock::{MockProvider, MockStep};
pub use openai_compatible::OpenAICompatibleProvider;

use std::str::FromStr;
use std::time::Duration;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
    OpenRouter,
    Groq,
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "groq" => Ok(Self::Groq),
            _ => Err(LlmError::UnknownProvider(s.to_string())),
        }
    }
}

impl ProviderKind {
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Groq => "GROQ_API_KEY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::OpenAI => "OpenAI",
            Self::OpenRouter => "OpenRouter",
            Self::Groq => "Groq",
        }
    }
}

/// Build a provider for `preset`, applying any per-provider overrides.
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind: ProviderKind = preset.provider.parse()?;
    let api_key = get_api_key(provider_config, kind)?;
    let timeout = provider_config
        .and_then(|c| c.request_timeout_secs)
        .map(Duration::from_secs);
    let base_url = provider_config.and_then(|c| c.base_url.as_deref());

    let provider: Box<dyn LlmProvider> = match kind {
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(
            &preset.model,
            api_key,
            base_url,
            timeout,
        )?),
        ProviderKind::OpenAI => {
            let provider = OpenAICompatibleProvider::openai(&preset.model, api_key, timeout)?;
            Box::new(match base_url {
                Some(url) => provider.with_base_url(url),
                None => provider,
            })
        }
        ProviderKind::OpenRouter => {
            let provider = OpenAICompatibleProvider::openrouter(&preset.model, api_key, timeout)?;
            Box::new(match base_url {
                Some(url) => provider.with_base_url(url),
                None => provider,
            })
        }
        ProviderKind::Groq => {
            let provider = OpenAICompatibleProvider::groq(&preset.model, api_key, timeout)?;
            Box::new(match base_url {
                Some(url) => provider.with_base_url(url),
                None => provider,
            })
        }
    };

    provider.is_available()?;
    Ok(provider)
}

/// Config value first, then the provider's environment variable.
fn get_api_key(config: Option<&ProviderConfig>, kind: ProviderKind) -> Result<String> {
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    std::env::var(kind.env_var()).map_err(|_| LlmError::MissingApiKey {
        provider: kind.display_name().to_string(),
        env_var: kind.env_var().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!("claude".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("groq".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
        assert!(matches!(
            "ollama".parse::<ProviderKind>(),
            Err(LlmError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_api_key_from_config_wins() {
        let config = ProviderConfig {
            api_key: Some("sk-config".to_string()),
            ..ProviderConfig::default()
        };
        let key = get_api_key(Some(&config), ProviderKind::OpenRouter).unwrap();
        assert_eq!(key, "sk-config");
    }

    #[test]
    fn test_get_provider_with_configured_key() {
        let preset = ModelPreset::new("openrouter", "meta-llama/llama-3.1-8b-instruct");
        let config = ProviderConfig {
            api_key: Some("sk-or".to_string()),
            base_url: Some("http://localhost:9999/v1/".to_string()),
            request_timeout_secs: Some(5),
        };
        let provider = get_provider(&preset, Some(&config)).unwrap();
        assert_eq!(provider.name(), "OpenRouter");
    }

    #[test]
    fn test_anthropic_blank_key_is_unavailable() {
        let preset = ModelPreset::new("anthropic", "claude-3-5-haiku-latest");
        let config = ProviderConfig {
            api_key: Some("  ".to_string()),
            ..ProviderConfig::default()
        };
        assert!(matches!(
            get_provider(&preset, Some(&config)),
            Err(LlmError::MissingApiKey { .. })
        ));
    }
}
