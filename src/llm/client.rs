//! Completion client abstractions
//!
//! The analyzer depends on a completion backend only through these traits,
//! which lets tests substitute scripted clients for the hosted API.

use crate::types::Result;
use crate::utils::toml_config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Token accounting reported by the completion endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Generated text plus usage metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

impl Completion {
    /// The answer as shown to the user: the text followed by one line per usage counter.
    pub fn render(&self) -> String {
        format!(
            "{}\nprompt tokens: {}\ncompletion tokens: {}\ntotal tokens: {}",
            self.text,
            self.usage.prompt_tokens,
            self.usage.completion_tokens,
            self.usage.total_tokens
        )
    }
}

/// Fixed sampling parameters sent with every completion request
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Number of completions requested
    pub n: u8,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.9,
            n: 1,
        }
    }
}

impl From<&LlmConfig> for SamplingParams {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature as f32,
            ..Self::default()
        }
    }
}

/// Text completion backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt` and return the first choice with usage counts
    async fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Creates completion clients bound to a per-request API key
pub trait CompletionClientFactory: Send + Sync {
    fn create(&self, api_key: &str, config: &LlmConfig) -> Result<Box<dyn CompletionClient>>;
}
