//! Text extraction and chunking over generated PDFs.

mod common;

use common::pdf::{pdf_with_pages, sample_policy, words, write_pdf};
use policy_analyzer::analyzer::chunk_pdf;
use policy_analyzer::pdf::{extract_pages, extract_pages_from_bytes};
use policy_analyzer::rag::chunker::parse_chunk;
use policy_analyzer::utils::toml_config::RetrievalConfig;
use tempfile::TempDir;

#[test]
fn test_extracts_every_page_in_order() {
    let bytes = pdf_with_pages(&sample_policy());
    let doc = extract_pages_from_bytes(&bytes, 1, None).unwrap();

    assert_eq!(doc.total_pages, 3);
    assert_eq!(doc.pages.len(), 3);
    assert!(doc.pages[0].contains("device identifiers"));
    assert!(doc.pages[1].contains("Acme Analytics"));
    assert!(doc.pages[2].contains("privacy officer"));
}

#[test]
fn test_extracted_text_is_normalized() {
    let bytes = pdf_with_pages(&["  spaced    out   text  "]);
    let doc = extract_pages_from_bytes(&bytes, 1, None).unwrap();

    assert_eq!(doc.pages[0], "spaced out text");
}

#[test]
fn test_page_range_is_respected() {
    let bytes = pdf_with_pages(&["one", "two", "three", "four"]);
    let doc = extract_pages_from_bytes(&bytes, 2, Some(3)).unwrap();

    assert_eq!(doc.pages, vec!["two".to_string(), "three".to_string()]);
    assert_eq!(doc.first_page, 2);
    assert_eq!(doc.total_pages, 4);
}

#[test]
fn test_start_past_the_end_yields_no_pages() {
    let bytes = pdf_with_pages(&["only page"]);
    let doc = extract_pages_from_bytes(&bytes, 5, None).unwrap();
    assert!(doc.pages.is_empty());
}

#[test]
fn test_extract_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "policy.pdf", &sample_policy());

    let doc = extract_pages(&path, 1, None).unwrap();
    assert_eq!(doc.pages.len(), 3);
    assert!(doc.word_count() > 20);
}

#[test]
fn test_chunk_pdf_tags_pages() {
    let dir = TempDir::new().unwrap();
    let first = words("a", 10);
    let second = words("b", 10);
    let path = write_pdf(dir.path(), "policy.pdf", &[&first, &second]);

    let retrieval = RetrievalConfig {
        word_length: 5,
        ..RetrievalConfig::default()
    };
    let (_, chunks) = chunk_pdf(&path, &retrieval).unwrap();

    let pages: Vec<u32> = chunks.iter().map(|c| parse_chunk(c).unwrap().0).collect();
    assert_eq!(pages, vec![1, 1, 2, 2]);
    assert_eq!(chunks[0], "[Page no. 1] \"a0 a1 a2 a3 a4\"");
}

#[test]
fn test_chunk_pdf_short_first_page_moves_to_second() {
    let dir = TempDir::new().unwrap();
    let first = words("a", 100);
    let second = words("b", 10);
    let path = write_pdf(dir.path(), "policy.pdf", &[&first, &second]);

    let (_, chunks) = chunk_pdf(&path, &RetrievalConfig::default()).unwrap();

    assert_eq!(chunks.len(), 1);
    let (page, text) = parse_chunk(&chunks[0]).unwrap();
    assert_eq!(page, 2);
    assert_eq!(text.split_whitespace().count(), 110);
}

#[test]
fn test_chunk_pdf_start_page_offsets_tags() {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(dir.path(), "policy.pdf", &["cover", "body text here"]);

    let retrieval = RetrievalConfig {
        start_page: 2,
        ..RetrievalConfig::default()
    };
    let (_, chunks) = chunk_pdf(&path, &retrieval).unwrap();

    assert_eq!(chunks, vec!["[Page no. 2] \"body text here\"".to_string()]);
}
