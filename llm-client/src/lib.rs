//! LLM client library for the readalong workspace
//!
//! One trait, [`LlmProvider`], in front of several chat backends:
//! - Anthropic Messages API
//! - OpenAI-compatible chat completions (OpenAI, OpenRouter, Groq)
//! - A scripted [`MockProvider`] for offline tests

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, MockStep, ProviderKind, get_provider};
