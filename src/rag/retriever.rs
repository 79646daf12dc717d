//! Semantic search over the chunks of one loaded document.

use chrono::{DateTime, Utc};
use std::time::Instant;

use crate::rag::embeddings::{embed_in_batches, Embedder};
use crate::rag::index::{DistanceMetric, NearestNeighbors};
use crate::types::{AppError, CorpusStatus, Result};

/// Where a corpus came from, for status reporting.
#[derive(Debug, Clone, Default)]
pub struct CorpusSource {
    pub name: String,
    pub pages: usize,
}

struct Corpus {
    chunks: Vec<String>,
    index: NearestNeighbors,
    source: CorpusSource,
    loaded_at: DateTime<Utc>,
}

/// Holds the fitted corpus. A new [`fit`](Self::fit) fully replaces the old one.
pub struct SemanticSearch {
    metric: DistanceMetric,
    corpus: Option<Corpus>,
}

impl SemanticSearch {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            corpus: None,
        }
    }

    pub fn set_metric(&mut self, metric: DistanceMetric) {
        self.metric = metric;
    }

    /// Embed `chunks` and fit the index over them.
    ///
    /// Any previously fitted corpus is dropped first, so a failed or
    /// cancelled fit leaves the searcher unfitted rather than serving the
    /// previous document.
    pub async fn fit(
        &mut self,
        chunks: Vec<String>,
        source: CorpusSource,
        embedder: &dyn Embedder,
        batch_size: usize,
    ) -> Result<usize> {
        self.corpus = None;

        if chunks.is_empty() {
            return Err(AppError::InvalidInput(
                "document contains no extractable text".to_string(),
            ));
        }

        let start = Instant::now();
        let embeddings = embed_in_batches(embedder, &chunks, batch_size).await?;

        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let index = NearestNeighbors::fit(embeddings, self.metric)?;
        let count = chunks.len();

        tracing::info!(
            source = %source.name,
            chunks = count,
            dimensions = index.dimensions(),
            metric = %self.metric,
            model = embedder.model_name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Corpus fitted"
        );

        self.corpus = Some(Corpus {
            chunks,
            index,
            source,
            loaded_at: Utc::now(),
        });

        Ok(count)
    }

    /// The `k` chunks nearest to `text`, nearest first.
    pub async fn query(&self, text: &str, k: usize, embedder: &dyn Embedder) -> Result<Vec<String>> {
        Ok(self
            .query_scored(text, k, embedder)
            .await?
            .into_iter()
            .map(|(chunk, _)| chunk)
            .collect())
    }

    /// Like [`query`](Self::query) but keeps each chunk's distance.
    pub async fn query_scored(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<(String, f32)>> {
        let corpus = self.corpus.as_ref().ok_or(AppError::NotFitted)?;

        let mut vectors = embedder.embed(&[text.to_string()]).await?;
        let query = match (vectors.pop(), vectors.is_empty()) {
            (Some(v), true) => v,
            _ => {
                return Err(AppError::Embedding(
                    "expected exactly one query embedding".to_string(),
                ))
            }
        };

        let neighbors = corpus.index.kneighbors(&query, k)?;
        Ok(neighbors
            .into_iter()
            .map(|n| (corpus.chunks[n.index].clone(), n.distance))
            .collect())
    }

    pub fn is_fitted(&self) -> bool {
        self.corpus.is_some()
    }

    pub fn len(&self) -> usize {
        self.corpus.as_ref().map_or(0, |c| c.chunks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chunks(&self) -> &[String] {
        match &self.corpus {
            Some(corpus) => &corpus.chunks,
            None => &[],
        }
    }

    pub fn status(&self) -> CorpusStatus {
        match &self.corpus {
            None => CorpusStatus::default(),
            Some(corpus) => CorpusStatus {
                loaded: true,
                source: Some(corpus.source.name.clone()),
                pages: corpus.source.pages,
                chunks: corpus.chunks.len(),
                dimensions: corpus.index.dimensions(),
                loaded_at: Some(corpus.loaded_at),
            },
        }
    }
}

impl Default for SemanticSearch {
    fn default() -> Self {
        Self::new(DistanceMetric::default())
    }
}
