use crate::{
    analyzer::{AnalyzeRequest, UploadSource},
    types::{AnalyzeForm, AnalyzeResponse},
    AppState,
};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};

/// Analyze a privacy policy.
///
/// Exactly one of `url` and `file` must be given. Validation and pipeline
/// failures are reported in the body with `error: true`; only a malformed
/// or oversized multipart body is an HTTP error, with the status axum assigns.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body(content = AnalyzeForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Answer or `[ERROR]:` message", body = AnalyzeResponse),
        (status = 400, description = "Malformed multipart body"),
        (status = 413, description = "Upload too large")
    ),
    tag = "analysis"
)]
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, MultipartError> {
    let mut request = AnalyzeRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "api_key" => request.api_key = field.text().await?,
            "url" => request.url = Some(field.text().await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file is chosen
                if !bytes.is_empty() {
                    request.file = Some(UploadSource::Bytes {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(Json(state.analyzer.analyze(&request).await))
}
