//! HTTP API handlers and routes
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! - `GET /` - Analysis form
//! - `POST /api/analyze` - Analyze a policy given by URL or upload (multipart)
//! - `POST /api/search` - Nearest chunks of the loaded policy to a query
//! - `GET /api/corpus` - Status of the loaded policy
//! - `GET /api/health` - Health check endpoint
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

use utoipa::OpenApi;

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types::{
    AnalyzeForm, AnalyzeResponse, CorpusStatus, HealthResponse, SearchHit, SearchRequest,
    SearchResponse,
};

/// OpenAPI description of the `/api` routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Policy Analyzer API",
        description = "Ask a fixed set of data-collection and data-sharing questions of a privacy policy PDF"
    ),
    paths(
        handlers::analyze::analyze,
        handlers::search::search,
        handlers::search::corpus_status,
        handlers::health::health,
    ),
    components(schemas(
        AnalyzeForm,
        AnalyzeResponse,
        SearchRequest,
        SearchHit,
        SearchResponse,
        CorpusStatus,
        HealthResponse,
    )),
    tags(
        (name = "analysis", description = "Policy analysis"),
        (name = "corpus", description = "Loaded document inspection"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;
