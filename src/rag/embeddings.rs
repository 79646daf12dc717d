//! Text embedding backends.
//!
//! The retriever only needs "texts in, vectors out". Two backends implement
//! it:
//!
//! - [`OpenAIEmbedder`] calls an OpenAI-compatible `/embeddings` endpoint with
//!   the caller's API key (default).
//! - `LocalEmbedder` runs a fastembed ONNX model in-process
//!   (`local-embeddings` feature).
//!
//! Embedders are created per request through an [`EmbedderFactory`] because
//! the remote backend is authenticated with the key the user submits.

use async_openai::{
    config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;
use std::sync::Arc;

use crate::llm::openai::{describe_error, openai_client};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{EmbeddingBackend, EmbeddingsConfig};

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `texts`, returning one vector per text in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

/// Builds an [`Embedder`] bound to a request's credential.
pub trait EmbedderFactory: Send + Sync {
    fn create(&self, api_key: &str, config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>>;
}

/// Embed `texts` in batches of `batch_size`, preserving order.
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    if batch_size == 0 {
        return Err(AppError::InvalidInput(
            "batch_size must be at least 1".to_string(),
        ));
    }

    let mut embeddings = Vec::with_capacity(texts.len());

    for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
        let vectors = embedder.embed(batch).await?;
        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "batch {} returned {} vectors for {} texts",
                batch_no,
                vectors.len(),
                batch.len()
            )));
        }
        tracing::debug!(batch = batch_no, size = batch.len(), "Embedded batch");
        embeddings.extend(vectors);
    }

    Ok(embeddings)
}

// ============================================================================
// OpenAI-compatible remote embeddings
// ============================================================================

pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIEmbedder {
    pub fn new(http: reqwest::Client, api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: openai_client(http, api_key, api_base),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(texts.to_vec())
            .build()
            .map_err(|e| AppError::Embedding(format!("Failed to build request: {}", e)))?;

        let mut response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| AppError::Embedding(describe_error(e, "embedding")))?;

        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

pub struct OpenAIEmbedderFactory {
    http: reqwest::Client,
}

impl OpenAIEmbedderFactory {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl EmbedderFactory for OpenAIEmbedderFactory {
    fn create(&self, api_key: &str, config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
        Ok(Arc::new(OpenAIEmbedder::new(
            self.http.clone(),
            &config.api_base,
            api_key,
            &config.model,
        )))
    }
}

// ============================================================================
// Local fastembed model
// ============================================================================

#[cfg(feature = "local-embeddings")]
pub use local::{LocalEmbedder, LocalEmbedderFactory};

#[cfg(feature = "local-embeddings")]
mod local {
    use super::*;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;

    /// Map a configured model name onto a fastembed model.
    fn resolve_model(name: &str) -> EmbeddingModel {
        match name.to_lowercase().as_str() {
            "baai/bge-small-en-v1.5" | "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
            "baai/bge-base-en-v1.5" | "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
            _ => EmbeddingModel::AllMiniLML6V2,
        }
    }

    pub struct LocalEmbedder {
        model: Arc<Mutex<TextEmbedding>>,
        name: String,
    }

    impl LocalEmbedder {
        pub fn new(model_name: &str) -> Result<Self> {
            let model = TextEmbedding::try_new(
                InitOptions::new(resolve_model(model_name)).with_show_download_progress(true),
            )
            .map_err(|e| AppError::Embedding(format!("Failed to init embeddings: {}", e)))?;

            Ok(Self {
                model: Arc::new(Mutex::new(model)),
                name: model_name.to_string(),
            })
        }
    }

    #[async_trait]
    impl Embedder for LocalEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let model = Arc::clone(&self.model);
            let texts = texts.to_vec();

            tokio::task::spawn_blocking(move || model.lock().embed(texts, None))
                .await
                .map_err(|e| AppError::Internal(format!("embedding task panicked: {}", e)))?
                .map_err(|e| AppError::Embedding(e.to_string()))
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }

    /// Shares one loaded model across requests; the API key is not needed.
    pub struct LocalEmbedderFactory {
        embedder: Arc<LocalEmbedder>,
    }

    impl LocalEmbedderFactory {
        pub fn new(model_name: &str) -> Result<Self> {
            Ok(Self {
                embedder: Arc::new(LocalEmbedder::new(model_name)?),
            })
        }
    }

    impl EmbedderFactory for LocalEmbedderFactory {
        fn create(&self, _api_key: &str, _config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
            Ok(self.embedder.clone())
        }
    }
}

/// Build the factory selected by configuration.
pub fn embedder_factory_from_config(
    config: &EmbeddingsConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn EmbedderFactory>> {
    match config.backend {
        EmbeddingBackend::OpenAI => Ok(Arc::new(OpenAIEmbedderFactory::new(http))),
        #[cfg(feature = "local-embeddings")]
        EmbeddingBackend::Local => Ok(Arc::new(LocalEmbedderFactory::new(&config.model)?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingBackend::Local => Err(AppError::Config(
            "local embeddings require the 'local-embeddings' feature".to_string(),
        )),
    }
}
