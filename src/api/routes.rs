use crate::api::handlers::{analyze, health, search};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Routes mounted under `/api`.
///
/// `max_upload_bytes` bounds the analyze request body, which carries the PDF.
pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/analyze",
            post(analyze::analyze).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/search", post(search::search))
        .route("/corpus", get(search::corpus_status))
        .route("/health", get(health::health))
}
