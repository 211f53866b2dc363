mod common;

use precis_common::PrecisError;
use precis_llm::config::LlmSettings;
use precis_llm::openai::OpenAiClient;
use precis_llm::traits::LlmClient;
use precis_llm::{ensure_llm_ready, SummaryClient, SummaryRequest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gpt-4o-mini";

fn client_for(server: &MockServer) -> OpenAiClient {
    OpenAiClient::with_endpoint(
        "sk-test".to_string(),
        MODEL.to_string(),
        &format!("{}/v1", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25 }
    })
}

#[tokio::test]
async fn summary_request_reaches_chat_completions() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let request = SummaryRequest::build("Example", "Hello world");

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": request.system_instruction },
                { "role": "user", "content": request.user_prompt }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(
            "An example page greeting the world."
        ))))
        .expect(1)
        .mount(&server)
        .await;

    let summary = SummaryClient::new(Arc::new(client_for(&server)));
    let result = summary.summarize(&request).await.unwrap();

    assert_eq!(result.text, "An example page greeting the world.");
    assert_eq!(result.model.as_deref(), Some("gpt-4o-mini-2024-07-18"));
}

#[tokio::test]
async fn empty_and_null_content_pass_through() {
    common::init_test_tracing();
    for content in [json!(""), json!(null)] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .generate("Say Ok", Some("system"), Some(8), None)
            .await
            .unwrap();
        assert_eq!(response.text, "");
        assert_eq!(response.tokens_used, Some(25));
    }
}

#[tokio::test]
async fn missing_choices_is_a_summary_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "x", "choices": [] })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("hi", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PrecisError::Summary(ref m) if m.contains("no choices")));
}

#[tokio::test]
async fn rate_limit_is_not_retried() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "You exceeded your current quota", "type": "insufficient_quota" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("hi", None, None, None)
        .await
        .unwrap_err();
    match err {
        PrecisError::Summary(msg) => assert!(msg.contains("429"), "message was {msg}"),
        other => panic!("expected summary error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_a_summary_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("hi", None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PrecisError::Summary(_)));
}

#[tokio::test]
async fn verify_reports_rejected_key_as_config_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/models/{MODEL}")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = LlmSettings {
        api_key: "sk-bad".into(),
        endpoint: format!("{}/v1", server.uri()),
        verify_on_startup: true,
        ..LlmSettings::default()
    };
    let err = ensure_llm_ready(&settings).await.err().unwrap();
    match err {
        PrecisError::Config(msg) => assert!(msg.contains("rejected the API key"), "{msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[tokio::test]
async fn verify_accepts_known_model() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/models/{MODEL}")))
        .and(header("authorization", "Bearer sk-good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": MODEL, "object": "model", "owned_by": "system"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = LlmSettings {
        api_key: "sk-good".into(),
        endpoint: format!("{}/v1/", server.uri()),
        verify_on_startup: true,
        ..LlmSettings::default()
    };
    let client = ensure_llm_ready(&settings).await.unwrap();
    assert_eq!(client.model_name(), MODEL);
}
