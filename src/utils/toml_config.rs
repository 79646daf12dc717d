//! TOML-based configuration for the policy analyzer
//!
//! All settings live in a single TOML file (`policy-analyzer.toml` by default).
//! Every field has a default, so a missing file yields a working configuration.
//!
//! # Hot Reloading
//!
//! Configuration changes are detected and applied at runtime.
//! Use `PolicyConfigManager` for thread-safe access to the current configuration.
//!
//! Most settings apply from the next request. The keys in
//! [`RESTART_REQUIRED_KEYS`] are read once at startup; a reload that changes
//! them is stored but logged as needing a restart.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::rag::index::DistanceMetric;

/// Default file name looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "policy-analyzer.toml";

/// Keys bound when the server starts (listener, body limit, embedder backend)
pub const RESTART_REQUIRED_KEYS: [&str; 4] = [
    "server.host",
    "server.port",
    "server.max_upload_mb",
    "embeddings.backend",
];

/// Root configuration structure loaded from policy-analyzer.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PolicyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Largest accepted upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Directory holding the transient PDF of the current submission
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_max_upload_mb() -> usize {
    25
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            max_upload_mb: default_max_upload_mb(),
            work_dir: default_work_dir(),
        }
    }
}

// ============= Retrieval Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Words per chunk
    #[serde(default = "default_word_length")]
    pub word_length: usize,

    /// First page to extract; also the number of the first page tag
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Last page to extract (inclusive); all pages when unset
    #[serde(default)]
    pub end_page: Option<u32>,

    /// Chunks per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Neighbours retrieved for the prompt
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub metric: DistanceMetric,
}

fn default_word_length() -> usize {
    150
}

fn default_start_page() -> u32 {
    1
}

fn default_batch_size() -> usize {
    500
}

fn default_top_k() -> usize {
    8
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            word_length: default_word_length(),
            start_page: default_start_page(),
            end_page: None,
            batch_size: default_batch_size(),
            top_k: default_top_k(),
            metric: DistanceMetric::default(),
        }
    }
}

// ============= Embedding Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint, authenticated with the request's key
    #[default]
    OpenAI,
    /// In-process fastembed model (requires the `local-embeddings` feature)
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Chosen at startup; changing it needs a restart
    #[serde(default)]
    pub backend: EmbeddingBackend,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_embedding_model(),
            api_base: default_api_base(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_completion_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f64 {
    0.9
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_completion_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

// ============= Timeout Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_fetch_secs")]
    pub fetch_secs: u64,

    #[serde(default = "default_embed_secs")]
    pub embed_secs: u64,

    #[serde(default = "default_completion_secs")]
    pub completion_secs: u64,
}

fn default_fetch_secs() -> u64 {
    60
}

fn default_embed_secs() -> u64 {
    120
}

fn default_completion_secs() -> u64 {
    180
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            fetch_secs: default_fetch_secs(),
            embed_secs: default_embed_secs(),
            completion_secs: default_completion_secs(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl From<ConfigError> for crate::types::AppError {
    fn from(err: ConfigError) -> Self {
        crate::types::AppError::Config(err.to_string())
    }
}

impl PolicyConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: PolicyConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Load the file if present, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::FileNotFound(p)) => {
                info!("No configuration at {:?}, using defaults", p);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate value ranges and feature availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if !matches!(self.server.log_format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "server.log_format must be 'pretty' or 'json', got '{}'",
                self.server.log_format
            )));
        }
        if self.retrieval.word_length == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.word_length must be at least 1".to_string(),
            ));
        }
        if self.retrieval.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.batch_size must be at least 1".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.retrieval.start_page == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.start_page is 1-based".to_string(),
            ));
        }
        if let Some(end) = self.retrieval.end_page {
            if end < self.retrieval.start_page {
                return Err(ConfigError::ValidationError(format!(
                    "retrieval.end_page ({}) is before start_page ({})",
                    end, self.retrieval.start_page
                )));
            }
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "llm.max_tokens must be at least 1".to_string(),
            ));
        }
        if self.embeddings.backend == EmbeddingBackend::Local && !cfg!(feature = "local-embeddings")
        {
            return Err(ConfigError::ValidationError(
                "embeddings.backend = \"local\" requires the 'local-embeddings' feature"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.fetch_secs)
    }

    pub fn embed_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.embed_secs)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.completion_secs)
    }

    /// Which of [`RESTART_REQUIRED_KEYS`] differ between `self` and `other`.
    pub fn restart_required_changes(&self, other: &PolicyConfig) -> Vec<&'static str> {
        let changed = [
            self.server.host != other.server.host,
            self.server.port != other.server.port,
            self.server.max_upload_mb != other.server.max_upload_mb,
            self.embeddings.backend != other.embeddings.backend,
        ];
        RESTART_REQUIRED_KEYS
            .iter()
            .zip(changed)
            .filter_map(|(key, changed)| changed.then_some(*key))
            .collect()
    }
}

// ============= Hot Reloading Configuration Manager =============

fn store_reloaded(current: &ArcSwap<PolicyConfig>, new_config: PolicyConfig) {
    let changed = current.load().restart_required_changes(&new_config);
    if !changed.is_empty() {
        warn!(
            keys = ?changed,
            "Reloaded config changes settings that only apply after a restart"
        );
    }
    current.store(Arc::new(new_config));
}

/// Thread-safe configuration manager with hot reloading support
pub struct PolicyConfigManager {
    config: Arc<ArcSwap<PolicyConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl PolicyConfigManager {
    /// Create a new configuration manager and load the initial config.
    ///
    /// A missing file is not an error; defaults are used until one appears.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = PolicyConfig::load_or_default(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing).
    /// This won't have file watching capabilities.
    pub fn from_config(config: PolicyConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<PolicyConfig> {
        self.config.load_full()
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = PolicyConfig::load(&self.config_path)?;
        store_reloaded(&self.config, new_config);

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the parent directory so editors that replace the file are seen
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce_duration) {
                    continue;
                }

                // Let the writer finish
                tokio::time::sleep(Duration::from_millis(100)).await;

                match PolicyConfig::load(&config_path) {
                    Ok(new_config) => {
                        store_reloaded(&config_arc, new_config);
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}
