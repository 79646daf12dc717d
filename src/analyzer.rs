//! Front door: validates a submission, loads the document and answers the
//! fixed policy question over it.
//!
//! A submission moves through `no input -> one valid input -> loaded ->
//! answered`. Validation failures return before any network or model call.
//! The loaded corpus lives in [`PolicyAnalyzer`] behind a single async lock
//! held from loading through answering, so concurrent submissions are served
//! one at a time and each answer is computed against its own document.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::llm::{Completion, CompletionClientFactory, PromptBuilder, POLICY_QUESTION};
use crate::pdf::fetch::{PdfFetcher, URL_CORPUS_FILE};
use crate::pdf::upload::{normalize_upload, persist_local_file, persist_upload};
use crate::pdf::{extract_pages, PolicyDocument};
use crate::rag::chunker::PageChunker;
use crate::rag::embeddings::EmbedderFactory;
use crate::rag::retriever::{CorpusSource, SemanticSearch};
use crate::types::{AnalyzeResponse, AppError, CorpusStatus, Result};
use crate::utils::toml_config::{PolicyConfigManager, RetrievalConfig};

pub const MISSING_KEY_MESSAGE: &str =
    "Please enter your Open AI Key. Get your key here: https://platform.openai.com/account/api-keys";
pub const NO_INPUT_MESSAGE: &str = "Both URL and PDF are empty. Provide at least one.";
pub const BOTH_INPUTS_MESSAGE: &str =
    "Both URL and PDF are provided. Please provide only one (either URL or PDF).";

/// A PDF supplied directly rather than by URL.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Bytes received over HTTP with the client's file name
    Bytes { file_name: String, bytes: Vec<u8> },
    /// A file on the local filesystem (CLI)
    Path(PathBuf),
}

impl UploadSource {
    fn display_name(&self) -> String {
        match self {
            UploadSource::Bytes { file_name, .. } => file_name.clone(),
            UploadSource::Path(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzeRequest {
    pub api_key: String,
    pub url: Option<String>,
    pub file: Option<UploadSource>,
}

/// The one document source a valid request names.
#[derive(Debug, Clone, Copy)]
pub enum PolicyInput<'a> {
    Url(&'a str),
    File(&'a UploadSource),
}

impl AnalyzeRequest {
    /// Check the credential and input combination, in that order.
    ///
    /// The URL is not parsed here: a request carrying both a malformed URL
    /// and a file is reported as having both inputs.
    pub fn validate(&self) -> Result<PolicyInput<'_>> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::InvalidInput(MISSING_KEY_MESSAGE.to_string()));
        }

        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        match (url, self.file.as_ref()) {
            (None, None) => Err(AppError::InvalidInput(NO_INPUT_MESSAGE.to_string())),
            (Some(_), Some(_)) => Err(AppError::InvalidInput(BOTH_INPUTS_MESSAGE.to_string())),
            (Some(url), None) => Ok(PolicyInput::Url(url)),
            (None, Some(file)) => Ok(PolicyInput::File(file)),
        }
    }
}

/// Run `fut` under `limit`, reporting expiry as a timeout of `stage`.
async fn with_timeout<T>(
    stage: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(stage.to_string(), limit.as_secs())),
    }
}

/// Extract and chunk a PDF using the retrieval settings.
pub fn chunk_pdf(path: &Path, retrieval: &RetrievalConfig) -> Result<(PolicyDocument, Vec<String>)> {
    let document = extract_pages(path, retrieval.start_page, retrieval.end_page)?;
    let chunks = PageChunker::new(retrieval.word_length)?
        .with_start_page(document.first_page)
        .chunk_pages(&document.pages);
    Ok((document, chunks))
}

pub struct PolicyAnalyzer {
    config: Arc<PolicyConfigManager>,
    embedders: Arc<dyn EmbedderFactory>,
    llm: Arc<dyn CompletionClientFactory>,
    fetcher: PdfFetcher,
    search: Mutex<SemanticSearch>,
    prompt: PromptBuilder,
}

impl PolicyAnalyzer {
    pub fn new(
        config: Arc<PolicyConfigManager>,
        embedders: Arc<dyn EmbedderFactory>,
        llm: Arc<dyn CompletionClientFactory>,
        http: reqwest::Client,
    ) -> Self {
        let metric = config.config().retrieval.metric;
        Self {
            config,
            embedders,
            llm,
            fetcher: PdfFetcher::new(http),
            search: Mutex::new(SemanticSearch::new(metric)),
            prompt: PromptBuilder::new(),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    /// Answer a submission as display text.
    ///
    /// Never fails: errors come back as `[ERROR]:`-prefixed strings.
    pub async fn question_answer(&self, request: AnalyzeRequest) -> String {
        self.analyze(&request).await.answer
    }

    /// Like [`question_answer`](Self::question_answer), flagging failures.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> AnalyzeResponse {
        match self.try_question_answer(request).await {
            Ok(completion) => AnalyzeResponse {
                answer: completion.render(),
                error: false,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Analysis failed");
                AnalyzeResponse {
                    answer: e.user_message(),
                    error: true,
                }
            }
        }
    }

    /// Validate, load the document, retrieve context and complete.
    pub async fn try_question_answer(&self, request: &AnalyzeRequest) -> Result<Completion> {
        let input = request.validate()?;
        let config = self.config.config();
        let start = Instant::now();

        let embedder = self.embedders.create(&request.api_key, &config.embeddings)?;
        let client = self.llm.create(&request.api_key, &config.llm)?;

        let mut search = self.search.lock().await;

        let (path, source_name) = match input {
            PolicyInput::Url(url) => {
                let dest = config.server.work_dir.join(URL_CORPUS_FILE);
                with_timeout(
                    "fetch",
                    config.fetch_timeout(),
                    self.fetcher.download(url, &dest),
                )
                .await?;
                (dest, url.to_string())
            }
            PolicyInput::File(upload) => {
                let temp = match upload {
                    UploadSource::Bytes { file_name, bytes } => {
                        persist_upload(&config.server.work_dir, file_name, bytes).await?
                    }
                    UploadSource::Path(source) => {
                        persist_local_file(&config.server.work_dir, source).await?
                    }
                };
                (normalize_upload(&temp).await?, upload.display_name())
            }
        };

        let retrieval = config.retrieval.clone();
        let (document, chunks) =
            tokio::task::spawn_blocking(move || chunk_pdf(&path, &retrieval))
                .await
                .map_err(|e| AppError::Internal(format!("PDF task panicked: {}", e)))??;

        tracing::info!(
            source = %source_name,
            pages = document.pages.len(),
            words = document.word_count(),
            chunks = chunks.len(),
            "Document loaded"
        );

        search.set_metric(config.retrieval.metric);
        let source = CorpusSource {
            name: source_name,
            pages: document.pages.len(),
        };
        with_timeout(
            "embedding",
            config.embed_timeout(),
            search.fit(chunks, source, embedder.as_ref(), config.retrieval.batch_size),
        )
        .await?;

        let context = with_timeout(
            "embedding",
            config.embed_timeout(),
            search.query(POLICY_QUESTION, config.retrieval.top_k, embedder.as_ref()),
        )
        .await?;

        let prompt = self.prompt.build(&context, POLICY_QUESTION);
        let completion = with_timeout(
            "completion",
            config.completion_timeout(),
            client.complete(&prompt),
        )
        .await?;

        tracing::info!(
            model = client.model_name(),
            context_chunks = context.len(),
            total_tokens = completion.usage.total_tokens,
            duration_ms = start.elapsed().as_millis() as u64,
            "Policy analyzed"
        );

        Ok(completion)
    }

    /// Nearest chunks of the loaded corpus to an ad-hoc query.
    pub async fn search(
        &self,
        api_key: &str,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<(String, f32)>> {
        if api_key.trim().is_empty() {
            return Err(AppError::InvalidInput(MISSING_KEY_MESSAGE.to_string()));
        }
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
        }

        let config = self.config.config();
        let search = self.search.lock().await;
        if !search.is_fitted() {
            return Err(AppError::NotFitted);
        }

        let embedder = self.embedders.create(api_key, &config.embeddings)?;
        let k = top_k.unwrap_or(config.retrieval.top_k).max(1);

        with_timeout(
            "embedding",
            config.embed_timeout(),
            search.query_scored(query, k, embedder.as_ref()),
        )
        .await
    }

    pub async fn status(&self) -> CorpusStatus {
        self.search.lock().await.status()
    }
}
