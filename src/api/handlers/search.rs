use crate::{
    types::{CorpusStatus, Result, SearchHit, SearchRequest, SearchResponse},
    AppState,
};
use axum::{extract::State, Json};
use std::time::Instant;

/// Search the loaded policy.
///
/// Returns the chunks nearest to `query`, nearest first, with their
/// distances under the configured metric.
#[utoipa::path(
    post,
    path = "/api/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Nearest chunks", body = SearchResponse),
        (status = 400, description = "Blank key or query"),
        (status = 409, description = "No document loaded"),
        (status = 502, description = "Embedding backend failed")
    ),
    tag = "corpus"
)]
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start = Instant::now();

    let results: Vec<SearchHit> = state
        .analyzer
        .search(&payload.api_key, &payload.query, payload.top_k)
        .await?
        .into_iter()
        .map(|(chunk, distance)| SearchHit { chunk, distance })
        .collect();

    let duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!(results = results.len(), duration_ms, "Corpus search completed");

    Ok(Json(SearchResponse {
        total: results.len(),
        results,
        duration_ms,
    }))
}

#[utoipa::path(
    get,
    path = "/api/corpus",
    responses(
        (status = 200, description = "Loaded document status", body = CorpusStatus)
    ),
    tag = "corpus"
)]
pub async fn corpus_status(State(state): State<AppState>) -> Json<CorpusStatus> {
    Json(state.analyzer.status().await)
}
