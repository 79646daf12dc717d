//! OpenAI-compatible client tests against a wiremock server.

mod common;

use common::pdf::{pdf_with_pages, sample_policy};
use common::test_config;
use policy_analyzer::llm::{CompletionClient, OpenAIClient, SamplingParams};
use policy_analyzer::rag::embeddings::{Embedder, OpenAIEmbedder};
use policy_analyzer::types::AppError;
use policy_analyzer::{AnalyzeRequest, AppState, PolicyConfigManager, UploadSource};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

// ============= Helper Functions =============

/// Answers `/embeddings` with `[input length, index]` per input, in reverse order
/// so clients must sort by `index`.
struct EmbeddingResponder;

impl Respond for EmbeddingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let inputs = body["input"].as_array().cloned().unwrap_or_default();

        let mut data: Vec<Value> = inputs
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let len = text.as_str().map(str::len).unwrap_or(0) as f64;
                json!({"object": "embedding", "index": i, "embedding": [len, i as f64]})
            })
            .collect();
        data.reverse();

        ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": data,
            "model": "text-embedding-3-small",
            "usage": {"prompt_tokens": 1, "total_tokens": 1}
        }))
    }
}

fn completion_body(text: &str) -> Value {
    json!({
        "id": "cmpl-1",
        "object": "text_completion",
        "created": 1700000000,
        "model": "gpt-3.5-turbo-instruct",
        "choices": [{"text": text, "index": 0, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 812, "completion_tokens": 64, "total_tokens": 876}
    })
}

fn client(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new(
        reqwest::Client::new(),
        "sk-test".to_string(),
        format!("{}/v1", server.uri()),
        "gpt-3.5-turbo-instruct".to_string(),
        SamplingParams::default(),
    )
}

// ============= Completions =============

#[tokio::test]
async fn test_completion_sends_fixed_sampling_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo-instruct",
            "prompt": "Query: q\nAnswer:",
            "max_tokens": 2000,
            "n": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(" Acme")))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client(&server).complete("Query: q\nAnswer:").await.unwrap();

    assert_eq!(completion.text, " Acme");
    assert_eq!(completion.usage.prompt_tokens, 812);
    assert_eq!(completion.usage.completion_tokens, 64);
    assert_eq!(completion.usage.total_tokens, 876);

    let requests = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!((sent["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    assert!(sent.get("stop").is_none());
}

#[tokio::test]
async fn test_bad_key_surfaces_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided: sk-test.", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let err = client(&server).complete("p").await.unwrap_err();
    match err {
        AppError::LLM(msg) => assert!(msg.contains("Incorrect API key provided")),
        other => panic!("expected LLM error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;
    let mut empty = completion_body("");
    empty["choices"] = json!([]);
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty))
        .mount(&server)
        .await;

    let err = client(&server).complete("p").await.unwrap_err();
    assert!(matches!(err, AppError::LLM(msg) if msg.contains("No response")));
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server).complete("p").await.unwrap_err();
    assert!(matches!(err, AppError::LLM(msg) if msg.contains("malformed")));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "The server had an error while processing your request."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).complete("p").await.unwrap_err();
    assert!(matches!(err, AppError::LLM(msg) if msg.contains("server had an error")));
}

// ============= Embeddings =============

#[tokio::test]
async fn test_embeddings_are_returned_in_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(EmbeddingResponder)
        .mount(&server)
        .await;

    let embedder = OpenAIEmbedder::new(
        reqwest::Client::new(),
        &format!("{}/v1", server.uri()),
        "sk-test",
        "text-embedding-3-small",
    );
    let texts = vec!["a".to_string(), "bbb".to_string(), "cc".to_string()];
    let vectors = embedder.embed(&texts).await.unwrap();

    assert_eq!(
        vectors,
        vec![vec![1.0, 0.0], vec![3.0, 1.0], vec![2.0, 2.0]]
    );
}

#[tokio::test]
async fn test_embedding_quota_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "You exceeded your current quota",
                "type": "insufficient_quota",
                "code": "insufficient_quota"
            }
        })))
        .mount(&server)
        .await;

    let embedder = OpenAIEmbedder::new(
        reqwest::Client::new(),
        &format!("{}/v1", server.uri()),
        "sk-test",
        "m",
    );
    let err = embedder.embed(&["x".to_string()]).await.unwrap_err();
    assert!(matches!(err, AppError::Embedding(msg) if msg.contains("exceeded your current quota")));
}

// ============= Full pipeline over HTTP =============

#[tokio::test]
async fn test_app_state_runs_against_openai_compatible_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(EmbeddingResponder)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("Company names: Acme")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.embeddings.api_base = format!("{}/v1", server.uri());
    config.llm.api_base = format!("{}/v1", server.uri());

    let state = AppState::from_config(Arc::new(PolicyConfigManager::from_config(config))).unwrap();
    let answer = state
        .analyzer
        .question_answer(AnalyzeRequest {
            api_key: "sk-test".to_string(),
            url: None,
            file: Some(UploadSource::Bytes {
                file_name: "policy.pdf".to_string(),
                bytes: pdf_with_pages(&sample_policy()),
            }),
        })
        .await;

    assert_eq!(
        answer,
        "Company names: Acme\nprompt tokens: 812\ncompletion tokens: 64\ntotal tokens: 876"
    );
}
