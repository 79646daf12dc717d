use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix carried by every user-facing failure message.
pub const ERROR_PREFIX: &str = "[ERROR]:";

// ============= API Request/Response Types =============

/// Multipart form accepted by `POST /api/analyze`.
///
/// Only used for the OpenAPI schema; the handler reads the fields directly
/// from the multipart stream.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeForm {
    /// OpenAI API key used for embeddings and completion
    pub api_key: String,
    /// URL of the privacy policy PDF
    #[serde(default)]
    pub url: Option<String>,
    /// Uploaded privacy policy PDF
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Model answer followed by usage lines, or an `[ERROR]:` message
    pub answer: String,
    /// True when `answer` is an error message
    pub error: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub api_key: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SearchHit {
    pub chunk: String,
    pub distance: f32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total: usize,
    pub duration_ms: u64,
}

/// Snapshot of the currently loaded corpus.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct CorpusStatus {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub pages: usize,
    pub chunks: usize,
    pub dimensions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to fetch PDF: {0}")]
    Fetch(String),

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("No document loaded yet; submit a PDF first")]
    NotFitted,

    #[error("{0} timed out after {1}s")]
    Timeout(String, u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Render the error the way the form displays it.
    ///
    /// Input errors carry complete sentences meant for the user and are shown
    /// without the variant label.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => format!("{} {}", ERROR_PREFIX, msg),
            other => format!("{} {}", ERROR_PREFIX, other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFitted => StatusCode::CONFLICT,
            AppError::Fetch(_) | AppError::Embedding(_) | AppError::LLM(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Timeout(..) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Pdf(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
