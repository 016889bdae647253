use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error(
        "API key not found for {provider}. Set {env_var} environment variable or add it to llm.toml."
    )]
    MissingApiKey { provider: String, env_var: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown model preset: {0}")]
    InvalidPreset(String),

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Server overloaded (HTTP {status}): {message}")]
    ServerOverloaded { status: u16, message: String },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Request to {provider} failed: {message}")]
    Transport { provider: String, message: String },

    #[error("{0} returned an empty completion")]
    EmptyResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LlmError {
    /// Whether the failure came from the remote side rather than local setup.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ServerOverloaded { .. }
                | Self::ApiError { .. }
                | Self::Transport { .. }
                | Self::EmptyResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
