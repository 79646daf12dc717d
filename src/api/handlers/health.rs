use crate::types::HealthResponse;
use axum::{response::Html, Json};

const INDEX_HTML: &str = include_str!("../../../assets/index.html");

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The analysis form.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
