use anyhow::{Context, Result};
use std::env;

use super::retry::RetryConfig;

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_MAX_TOKENS: i32 = 1024;

/// Unified enum to wrap different provider configurations
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Anthropic(AnthropicProviderConfig),
}

pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub retry: RetryConfig,
}

impl OpenAiProviderConfig {
    /// Build a config from the environment: `OPENAI_API_KEY` is required,
    /// `OPENAI_HOST` optional.
    pub fn from_env(model: Option<String>) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable is required")?;
        let host = env::var("OPENAI_HOST").unwrap_or_else(|_| OPENAI_HOST.to_string());
        Ok(Self {
            host,
            api_key,
            model: model.unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            temperature: None,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            retry: RetryConfig::default(),
        })
    }
}

pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub retry: RetryConfig,
}

impl AnthropicProviderConfig {
    /// Build a config from the environment: `ANTHROPIC_API_KEY` is required,
    /// `ANTHROPIC_HOST` optional.
    pub fn from_env(model: Option<String>) -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable is required")?;
        let host = env::var("ANTHROPIC_HOST").unwrap_or_else(|_| ANTHROPIC_HOST.to_string());
        Ok(Self {
            host,
            api_key,
            model: model.unwrap_or_else(|| ANTHROPIC_DEFAULT_MODEL.to_string()),
            temperature: None,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            retry: RetryConfig::default(),
        })
    }
}
