//! Retrieval pipeline
//!
//! Turns a document's page texts into a searchable corpus and answers
//! "which chunks are closest to this question" lookups.
//!
//! # Module Structure
//!
//! - [`rag::chunker`](crate::rag::chunker) - Page-tagged word chunking with tail merge
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedding backends (OpenAI-compatible, fastembed)
//! - [`rag::index`](crate::rag::index) - Exact k-nearest-neighbour index
//! - [`rag::retriever`](crate::rag::retriever) - Fit/query orchestration over one corpus
//!
//! # Pipeline
//!
//! 1. **Chunking** - pages are cut into `word_length` word windows
//! 2. **Embedding** - chunks are embedded in batches
//! 3. **Indexing** - vectors are fitted into a k-NN index
//! 4. **Retrieval** - the question is embedded and its nearest chunks returned
//!
//! # Example
//!
//! ```ignore
//! use policy_analyzer::rag::{chunker::PageChunker, retriever::{SemanticSearch, CorpusSource}};
//!
//! let chunks = PageChunker::new(150)?.chunk_pages(&document.pages);
//! let mut search = SemanticSearch::default();
//! search.fit(chunks, CorpusSource::default(), embedder.as_ref(), 500).await?;
//! let top = search.query(POLICY_QUESTION, 8, embedder.as_ref()).await?;
//! ```

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod retriever;
