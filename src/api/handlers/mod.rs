//! API request handlers.

/// Policy analysis from a multipart form.
pub mod analyze;
/// Service health and the form page.
pub mod health;
/// Ad-hoc search and corpus status.
pub mod search;
