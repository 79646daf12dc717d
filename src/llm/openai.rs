use crate::llm::client::{
    Completion, CompletionClient, CompletionClientFactory, SamplingParams, TokenUsage,
};
use crate::types::{AppError, Result};
use crate::utils::toml_config::LlmConfig;
use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::completions::CreateCompletionRequestArgs,
    Client,
};
use async_trait::async_trait;
use std::time::Duration;

/// Build an async-openai client on a shared connection pool.
///
/// Retries are off: a failed call surfaces immediately.
pub(crate) fn openai_client(
    http: reqwest::Client,
    api_key: &str,
    api_base: &str,
) -> Client<OpenAIConfig> {
    let config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base.trim_end_matches('/'));

    Client::with_config(config)
        .with_http_client(http)
        .with_backoff(
            backoff::ExponentialBackoffBuilder::new()
                .with_max_elapsed_time(Some(Duration::ZERO))
                .build(),
        )
}

/// Readable text for an async-openai error.
pub(crate) fn describe_error(error: OpenAIError, what: &str) -> String {
    match error {
        OpenAIError::ApiError(api) => format!("OpenAI API error: {}", api.message),
        OpenAIError::JSONDeserialize(..) => format!("malformed {} response: {}", what, error),
        other => format!("OpenAI API error: {}", other),
    }
}

/// Client for the OpenAI-compatible `/completions` endpoint.
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    params: SamplingParams,
}

impl OpenAIClient {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        api_base: String,
        model: String,
        params: SamplingParams,
    ) -> Self {
        Self {
            client: openai_client(http, &api_key, &api_base),
            model,
            params,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let request = CreateCompletionRequestArgs::default()
            .model(&self.model)
            .prompt(prompt)
            .max_tokens(self.params.max_tokens)
            .n(self.params.n)
            .temperature(self.params.temperature)
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .completions()
            .create(request)
            .await
            .map_err(|e| AppError::LLM(describe_error(e, "completion")))?;

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))?;

        tracing::debug!(
            model = %self.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion received"
        );

        Ok(Completion { text, usage })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Builds [`OpenAIClient`]s sharing one HTTP connection pool.
pub struct OpenAIClientFactory {
    http: reqwest::Client,
}

impl OpenAIClientFactory {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl CompletionClientFactory for OpenAIClientFactory {
    fn create(&self, api_key: &str, config: &LlmConfig) -> Result<Box<dyn CompletionClient>> {
        Ok(Box::new(OpenAIClient::new(
            self.http.clone(),
            api_key.to_string(),
            config.api_base.clone(),
            config.model.clone(),
            SamplingParams::from(config),
        )))
    }
}
