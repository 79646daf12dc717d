//! Mock embedding and completion backends.
//!
//! These stand in for the hosted API so pipeline behaviour can be checked
//! without network access or credentials.

use async_trait::async_trait;
use parking_lot::Mutex;
use policy_analyzer::llm::{Completion, CompletionClient, CompletionClientFactory, TokenUsage};
use policy_analyzer::rag::embeddings::{Embedder, EmbedderFactory};
use policy_analyzer::types::{AppError, Result};
use policy_analyzer::utils::toml_config::{EmbeddingsConfig, LlmConfig};
use std::sync::Arc;
use std::time::Duration;

pub const MOCK_DIMENSIONS: usize = 16;

/// Hashes each word into one of [`MOCK_DIMENSIONS`] buckets and counts.
///
/// Texts sharing words land close together, which is enough to make
/// nearest-neighbour results predictable.
pub struct MockEmbedder;

impl MockEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; MOCK_DIMENSIONS];
        for word in text.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if word.is_empty() {
                continue;
            }
            let bucket = word.bytes().map(|b| b as usize).sum::<usize>() % MOCK_DIMENSIONS;
            v[bucket] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AppError::Embedding("Mock embedding failure".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-embedder"
    }
}

/// Sleeps before embedding, for exercising the embedding timeout.
pub struct SlowEmbedder(pub Duration);

#[async_trait]
impl Embedder for SlowEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        tokio::time::sleep(self.0).await;
        MockEmbedder.embed(texts).await
    }

    fn model_name(&self) -> &str {
        "slow-embedder"
    }
}

/// Hands out one shared embedder and records the keys it was asked for.
pub struct MockEmbedderFactory {
    embedder: Arc<dyn Embedder>,
    pub keys: Mutex<Vec<String>>,
}

impl MockEmbedderFactory {
    pub fn new(embedder: impl Embedder + 'static) -> Self {
        Self {
            embedder: Arc::new(embedder),
            keys: Mutex::new(Vec::new()),
        }
    }
}

impl EmbedderFactory for MockEmbedderFactory {
    fn create(&self, api_key: &str, _config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
        self.keys.lock().push(api_key.to_string());
        Ok(Arc::clone(&self.embedder))
    }
}

/// Completion client returning a fixed answer and capturing every prompt.
#[derive(Clone)]
pub struct MockCompletionClient {
    response: String,
    usage: TokenUsage,
    should_fail: bool,
    delay: Option<Duration>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            usage: TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 20,
                total_tokens: 120,
            },
            should_fail: false,
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Answers only after `delay`.
    pub fn slow(response: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(response)
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(Completion {
            text: self.response.clone(),
            usage: self.usage,
        })
    }

    fn model_name(&self) -> &str {
        "mock-completion"
    }
}

pub struct MockCompletionFactory {
    client: MockCompletionClient,
}

impl MockCompletionFactory {
    pub fn new(client: MockCompletionClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &MockCompletionClient {
        &self.client
    }
}

impl CompletionClientFactory for MockCompletionFactory {
    fn create(&self, _api_key: &str, _config: &LlmConfig) -> Result<Box<dyn CompletionClient>> {
        Ok(Box::new(self.client.clone()))
    }
}
