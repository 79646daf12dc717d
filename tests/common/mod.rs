//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;
pub mod pdf;

use policy_analyzer::utils::toml_config::PolicyConfig;
use policy_analyzer::{PolicyAnalyzer, PolicyConfigManager};
use std::path::Path;
use std::sync::Arc;

use mocks::{MockCompletionClient, MockCompletionFactory, MockEmbedder, MockEmbedderFactory};
use policy_analyzer::rag::embeddings::Embedder;

/// Default config with the work dir moved into `work_dir` and small timeouts.
pub fn test_config(work_dir: &Path) -> PolicyConfig {
    let mut config = PolicyConfig::default();
    config.server.work_dir = work_dir.to_path_buf();
    config.timeouts.fetch_secs = 5;
    config.timeouts.embed_secs = 5;
    config.timeouts.completion_secs = 5;
    config
}

/// An analyzer backed by the deterministic mocks.
pub fn mock_analyzer(
    config: PolicyConfig,
    completion: MockCompletionClient,
) -> (PolicyAnalyzer, Arc<MockEmbedderFactory>, Arc<MockCompletionFactory>) {
    mock_analyzer_with(config, MockEmbedder, completion)
}

/// Like [`mock_analyzer`] with a chosen embedder.
pub fn mock_analyzer_with(
    config: PolicyConfig,
    embedder: impl Embedder + 'static,
    completion: MockCompletionClient,
) -> (PolicyAnalyzer, Arc<MockEmbedderFactory>, Arc<MockCompletionFactory>) {
    let embedders = Arc::new(MockEmbedderFactory::new(embedder));
    let llm = Arc::new(MockCompletionFactory::new(completion));
    let analyzer = PolicyAnalyzer::new(
        Arc::new(PolicyConfigManager::from_config(config)),
        embedders.clone(),
        llm.clone(),
        reqwest::Client::new(),
    );
    (analyzer, embedders, llm)
}
