use reqwest::Url;
use std::path::Path;

use crate::types::{AppError, Result};

/// File name used for documents fetched by URL; each fetch overwrites it.
pub const URL_CORPUS_FILE: &str = "corpus.pdf";

/// Downloads PDFs over HTTP(S).
#[derive(Clone)]
pub struct PdfFetcher {
    http: reqwest::Client,
}

impl PdfFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch `url` and write the body to `dest`, returning the byte count.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let url = parse_pdf_url(url)?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("{} returned {}", url, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Fetch(format!("{}: {}", url, e)))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;

        tracing::info!(url = %url, bytes = bytes.len(), "Downloaded PDF");
        Ok(bytes.len() as u64)
    }
}

/// Accept only absolute http(s) URLs.
pub fn parse_pdf_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Fetch(format!("invalid URL '{}': {}", raw.trim(), e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Fetch(format!(
            "unsupported URL scheme '{}'; use http or https",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/policy.pdf")]
    #[case("  http://localhost:8080/a.pdf  ")]
    fn test_accepts_http_urls(#[case] raw: &str) {
        assert!(parse_pdf_url(raw).is_ok());
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://example.com/policy.pdf")]
    #[case("file:///etc/passwd")]
    fn test_rejects_other_urls(#[case] raw: &str) {
        assert!(matches!(parse_pdf_url(raw), Err(AppError::Fetch(_))));
    }
}
