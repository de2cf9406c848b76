//! HTTP capability implementations exercised against a mock server.

use httpmock::prelude::*;
use serde_json::json;
use url::Url;

use docqa::capabilities::{
    EmbeddingCapability, EmbeddingError, GenerationCapability, GenerationError,
    GenerationRequest, HttpEmbedder, HttpGenerator,
};

fn base_url(server: &MockServer) -> Url {
    Url::parse(&server.url("/v1")).unwrap()
}

fn generation_request() -> GenerationRequest {
    GenerationRequest {
        system: "instructions plus context".to_string(),
        user: "the question".to_string(),
    }
}

#[tokio::test]
async fn embedder_parses_an_embeddings_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/embeddings")
                .header("authorization", "Bearer test-key")
                .json_body_partial(r#"{"model": "embed-model", "input": ["hello world"]}"#);
            then.status(200)
                .json_body(json!({"data": [{"embedding": [0.25, -0.5, 1.0]}]}));
        })
        .await;

    let embedder = HttpEmbedder::new(
        reqwest::Client::new(),
        &base_url(&server),
        "test-key",
        "embed-model",
    );
    let vector = embedder.embed("hello world").await.unwrap();
    assert_eq!(vector, vec![0.25, -0.5, 1.0]);
    mock.assert_async().await;
}

#[tokio::test]
async fn embedder_surfaces_error_statuses() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(429).body("rate limited");
        })
        .await;

    let embedder = HttpEmbedder::new(
        reqwest::Client::new(),
        &base_url(&server),
        "test-key",
        "embed-model",
    );
    match embedder.embed("hello").await {
        Err(EmbeddingError::Status { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn embedder_rejects_a_response_without_embeddings() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({"data": []}));
        })
        .await;

    let embedder = HttpEmbedder::new(
        reqwest::Client::new(),
        &base_url(&server),
        "test-key",
        "embed-model",
    );
    assert!(matches!(
        embedder.embed("hello").await,
        Err(EmbeddingError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn generator_extracts_the_answer() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key")
                .json_body_partial(
                    r#"{
                        "model": "chat-model",
                        "messages": [
                            {"role": "system", "content": "instructions plus context"},
                            {"role": "user", "content": "the question"}
                        ]
                    }"#,
                );
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": "A concise answer."}}]
            }));
        })
        .await;

    let generator = HttpGenerator::new(
        reqwest::Client::new(),
        &base_url(&server),
        "test-key",
        "chat-model",
    );
    let response = generator.generate(&generation_request()).await.unwrap();
    assert_eq!(response.answer.as_deref(), Some("A concise answer."));
    mock.assert_async().await;
}

#[tokio::test]
async fn generator_treats_missing_content_as_no_answer() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .json_body(json!({"choices": [{"message": {"role": "assistant"}}]}));
        })
        .await;

    let generator = HttpGenerator::new(
        reqwest::Client::new(),
        &base_url(&server),
        "test-key",
        "chat-model",
    );
    let response = generator.generate(&generation_request()).await.unwrap();
    assert_eq!(response.answer, None);
}

#[tokio::test]
async fn generator_surfaces_error_statuses() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500).body("internal error");
        })
        .await;

    let generator = HttpGenerator::new(
        reqwest::Client::new(),
        &base_url(&server),
        "test-key",
        "chat-model",
    );
    assert!(matches!(
        generator.generate(&generation_request()).await,
        Err(GenerationError::Status { status: 500, .. })
    ));
}
