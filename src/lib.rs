//! # Policy Analyzer
//!
//! Answers a fixed set of questions about a privacy policy: which companies
//! receive user data, what data is collected, what is shared, and for which
//! purpose. The policy is given as a PDF URL or upload; its text is split into
//! page-tagged chunks, embedded, and the chunks nearest to the question are
//! sent to an OpenAI-compatible completion model.
//!
//! ## Overview
//!
//! Policy Analyzer can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `policy-analyzer` binary and open the form
//! 2. **As a library** - Drive [`PolicyAnalyzer`] from your own code
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use policy_analyzer::{AnalyzeRequest, AppState, PolicyConfigManager};
//! use std::sync::Arc;
//!
//! let config_manager = Arc::new(PolicyConfigManager::new("policy-analyzer.toml")?);
//! let state = AppState::from_config(config_manager)?;
//!
//! let answer = state
//!     .analyzer
//!     .question_answer(AnalyzeRequest {
//!         api_key: std::env::var("OPENAI_API_KEY")?,
//!         url: Some("https://example.com/privacy.pdf".to_string()),
//!         file: None,
//!     })
//!     .await;
//! println!("{}", answer);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `local-embeddings` | Embed in-process with fastembed instead of the remote API |
//! | `swagger-ui` | Serve interactive API docs at `/swagger-ui/` |
//! | `full` | All of the above |
//!
//! ## Modules
//!
//! - [`analyzer`] - Input validation and the load, retrieve, answer sequence
//! - [`api`] - HTTP handlers and routes
//! - [`llm`] - Completion clients and prompt assembly
//! - [`pdf`] - Download, upload storage and text extraction
//! - [`rag`] - Chunking, embeddings and nearest-neighbour search
//! - [`utils`] - TOML configuration with hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Front door and pipeline sequencing.
pub mod analyzer;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Completion clients and prompt assembly.
pub mod llm;
/// PDF input handling.
pub mod pdf;
/// Chunking, embeddings and semantic search.
pub mod rag;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

pub use analyzer::{AnalyzeRequest, PolicyAnalyzer, UploadSource};
pub use types::{AppError, Result};
pub use utils::toml_config::{PolicyConfig, PolicyConfigManager};

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::llm::OpenAIClientFactory;
use crate::rag::embeddings::embedder_factory_from_config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<PolicyConfigManager>,
    /// Holds the loaded policy and runs submissions against it
    pub analyzer: Arc<PolicyAnalyzer>,
}

impl AppState {
    /// Wire the production backends: OpenAI-compatible completions and the
    /// configured embedding backend, sharing one HTTP client.
    pub fn from_config(config_manager: Arc<PolicyConfigManager>) -> Result<Self> {
        let config = config_manager.config();
        let http = reqwest::Client::builder()
            .user_agent(concat!("policy-analyzer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let embedders = embedder_factory_from_config(&config.embeddings, http.clone())?;
        let llm = Arc::new(OpenAIClientFactory::new(http.clone()));
        let analyzer = PolicyAnalyzer::new(Arc::clone(&config_manager), embedders, llm, http);

        Ok(Self {
            config_manager,
            analyzer: Arc::new(analyzer),
        })
    }
}

/// Build the full application router: form page, `/api` routes, OpenAPI.
pub fn build_app(state: AppState) -> Router {
    let max_upload_bytes = state.config_manager.config().server.max_upload_mb * 1024 * 1024;

    let app = Router::new()
        .route("/", get(api::handlers::health::index))
        .nest("/api", api::routes::create_router(max_upload_bytes))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(api::ApiDoc::openapi()) }),
        );

    #[cfg(feature = "swagger-ui")]
    let app = app.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/swagger.json", api::ApiDoc::openapi()),
    );

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
