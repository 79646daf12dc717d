//! One-shot subcommands: `analyze`, `chunks` and `config`.

use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::output::Output;
use crate::analyzer::{chunk_pdf, AnalyzeRequest, UploadSource};
use crate::utils::toml_config::{PolicyConfig, PolicyConfigManager};
use crate::AppState;

/// Analyze one policy and print the answer to stdout.
///
/// Returns `false` when the answer is an `[ERROR]:` message.
pub async fn analyze(
    config_manager: Arc<PolicyConfigManager>,
    url: Option<String>,
    file: Option<PathBuf>,
    api_key: String,
) -> anyhow::Result<bool> {
    let state = AppState::from_config(config_manager).context("Failed to set up analyzer")?;

    let request = AnalyzeRequest {
        api_key,
        url,
        file: file.map(UploadSource::Path),
    };
    let response = state.analyzer.analyze(&request).await;

    if response.error {
        eprintln!("{}", response.answer);
    } else {
        println!("{}", response.answer);
    }
    Ok(!response.error)
}

/// Print the page-tagged chunks of `path`.
pub fn chunks(
    config: &PolicyConfig,
    path: &Path,
    word_length: Option<usize>,
    output: &Output,
) -> anyhow::Result<()> {
    let mut retrieval = config.retrieval.clone();
    if let Some(word_length) = word_length {
        retrieval.word_length = word_length;
    }

    let (document, chunks) = chunk_pdf(path, &retrieval)
        .with_context(|| format!("Failed to chunk {}", path.display()))?;

    for (index, chunk) in chunks.iter().enumerate() {
        output.chunk(index, chunk);
    }

    eprintln!(
        "{} pages, {} words, {} chunks of up to {} words",
        document.pages.len(),
        document.word_count(),
        chunks.len(),
        retrieval.word_length
    );
    Ok(())
}

/// Show the effective configuration, optionally validating it.
pub fn config(
    config_manager: &PolicyConfigManager,
    validate: bool,
    as_toml: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let config = config_manager.config();
    let path = config_manager.path();

    if as_toml {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    output.header("Configuration");
    if path.exists() {
        output.kv("File", &path.display().to_string());
    } else {
        output.kv("File", &format!("{} (not found, using defaults)", path.display()));
    }

    output.header("Server");
    output.kv("Address", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("Log", &format!("{} ({})", config.server.log_level, config.server.log_format));
    output.kv("Work dir", &config.server.work_dir.display().to_string());
    output.kv("Max upload", &format!("{} MB", config.server.max_upload_mb));

    output.header("Retrieval");
    output.kv("Words per chunk", &config.retrieval.word_length.to_string());
    let pages = match config.retrieval.end_page {
        Some(end) => format!("{}..={}", config.retrieval.start_page, end),
        None => format!("{}..", config.retrieval.start_page),
    };
    output.kv("Pages", &pages);
    output.kv("Neighbours", &config.retrieval.top_k.to_string());
    output.kv("Metric", &config.retrieval.metric.to_string());
    output.kv("Batch size", &config.retrieval.batch_size.to_string());

    output.header("Models");
    output.kv(
        "Embeddings",
        &format!("{:?} {} ({})", config.embeddings.backend, config.embeddings.model, config.embeddings.api_base),
    );
    output.kv(
        "Completion",
        &format!(
            "{} ({}), max_tokens {}, temperature {}",
            config.llm.model, config.llm.api_base, config.llm.max_tokens, config.llm.temperature
        ),
    );
    output.kv(
        "Timeouts",
        &format!(
            "fetch {}s, embed {}s, completion {}s",
            config.timeouts.fetch_secs, config.timeouts.embed_secs, config.timeouts.completion_secs
        ),
    );

    if validate {
        println!();
        match config.validate() {
            Ok(()) => output.success("Configuration is valid"),
            Err(e) => {
                output.error(&e.to_string());
                bail!("invalid configuration");
            }
        }
    }

    Ok(())
}
