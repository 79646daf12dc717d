//! Init command implementation
//!
//! Writes a commented `policy-analyzer.toml`, a `.env.example` and the work
//! directory.

use super::output::Output;
use crate::utils::toml_config::DEFAULT_CONFIG_FILE;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    Success,
    /// A config file exists and `force` was not given
    AlreadyExists,
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Policy Analyzer");

    let base_path = &config.path;
    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.info("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let data_dir = base_path.join("data");
    if data_dir.exists() {
        output.info("data/ already exists, skipped");
    } else {
        if let Err(e) = fs::create_dir_all(&data_dir) {
            output.error(&format!("Failed to create data: {}", e));
            return InitResult::Error(e.to_string());
        }
        output.success("Created data/");
    }

    if let Err(e) = write_file(&config_path, &generate_config_toml(), config.force) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.success(&format!("Created {}", DEFAULT_CONFIG_FILE));

    let env_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.success("Created .env.example");

    output.header("Next Steps");
    output.info("Set OPENAI_API_KEY in .env (see .env.example), then run `policy-analyzer`");
    output.info("The form is served at http://127.0.0.1:7860/");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_config_toml() -> String {
    r#"# Policy Analyzer configuration
# Every key is optional; the values below are the defaults.
# Edits apply while the server runs, except host, port, max_upload_mb
# and embeddings.backend, which need a restart.

[server]
host = "127.0.0.1"
port = 7860
log_level = "info"
# "pretty" or "json"
log_format = "pretty"
# Restart to change
max_upload_mb = 25
# Fetched and uploaded PDFs are written here
work_dir = "./data"

[retrieval]
# Words per chunk
word_length = 150
# First page to read; page tags count from here
start_page = 1
# end_page = 40
# Texts per embedding request
batch_size = 500
# Chunks included in the prompt
top_k = 8
# "euclidean" or "cosine"
metric = "euclidean"

[embeddings]
# "openai" or "local" (requires the local-embeddings feature); restart to change
backend = "openai"
model = "text-embedding-3-small"
api_base = "https://api.openai.com/v1"

[llm]
api_base = "https://api.openai.com/v1"
model = "gpt-3.5-turbo-instruct"
max_tokens = 2000
temperature = 0.9

[timeouts]
fetch_secs = 60
embed_secs = 120
completion_secs = 180
"#
    .to_string()
}

fn generate_env_example() -> String {
    r#"# Used by `policy-analyzer analyze` when --api-key is not given.
# The web form always asks for a key.
OPENAI_API_KEY=sk-...

# Overrides [server] log_level, e.g. policy_analyzer=debug,tower_http=info
# RUST_LOG=info
"#
    .to_string()
}
