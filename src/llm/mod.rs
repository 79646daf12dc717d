//! LLM completion clients and prompt assembly
//!
//! - [`client`] - `CompletionClient` / `CompletionClientFactory` traits and usage types
//! - [`openai`] - OpenAI-compatible `/completions` client over `async-openai`
//! - [`prompt`] - fixed question and instruction template

pub mod client;
pub mod openai;
pub mod prompt;

pub use client::{
    Completion, CompletionClient, CompletionClientFactory, SamplingParams, TokenUsage,
};
pub use openai::{OpenAIClient, OpenAIClientFactory};
pub use prompt::{PromptBuilder, POLICY_QUESTION};
