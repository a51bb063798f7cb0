//! The pipeline and adapter together against a stub chat-completion endpoint.

use pretty_assertions::assert_eq;
use serde_json::json;
use slides_rag::{
    config::{MistralModel, ModelConfig},
    messages::Role,
    services::GenerationParams,
    LanguageModel, MistralLm, RagError, SlidesRag,
};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn completion(text: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-e2e",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "ministral-3b-2410",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
}

fn lm_for(server: &MockServer, max_tokens: u32) -> MistralLm {
    let config = ModelConfig::new(MistralModel::Ministral3b, Some("x".into()), 0.0, max_tokens)
        .unwrap()
        .with_base_url(server.uri());
    MistralLm::new(config, GenerationParams::new()).unwrap()
}

#[tokio::test]
async fn prompt_scenario_returns_single_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "ministral-3b-2410",
            "temperature": 0.0,
            "max_tokens": 16,
            "messages": [{"role": "user", "content": "2+2=?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("4")))
        .expect(1)
        .mount(&server)
        .await;

    let mut lm = lm_for(&server, 16);
    let out = lm.generate("2+2=?".into(), GenerationParams::new()).await.unwrap();

    assert_eq!(out, vec!["4".to_string()]);
    assert_eq!(lm.history().len(), 1);
    assert_eq!(lm.history()[0].prompt.as_deref(), Some("2+2=?"));
}

#[tokio::test]
async fn pipeline_answers_through_adapter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "[[ ## reasoning ## ]]\nSlide 2 lists the stack.\n\n[[ ## answer ## ]]\nRust\n\n[[ ## completed ## ]]",
        )))
        .mount(&server)
        .await;

    let mut rag = SlidesRag::new(lm_for(&server, 256));
    let prediction = rag.forward("Which language is used?").await.unwrap();
    assert_eq!(prediction.answer(), Some("Rust"));
    assert_eq!(prediction.reasoning(), Some("Slide 2 lists the stack."));

    let history = rag.lm().history();
    assert_eq!(history.len(), 1);
    assert!(history[0].prompt.is_none());
    assert_eq!(history[0].messages[0].role, Role::System);
    assert!(history[0].messages[1].content.contains("Which language is used?"));
}

#[tokio::test]
async fn pipeline_retries_rate_limit_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "[[ ## reasoning ## ]] r [[ ## answer ## ]] ok",
        )))
        .mount(&server)
        .await;

    let mut rag = SlidesRag::new(lm_for(&server, 32));
    let prediction = rag.forward("q").await.unwrap();
    assert_eq!(prediction.answer(), Some("ok"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert_eq!(rag.lm().history().len(), 1);
}

#[tokio::test]
async fn pipeline_surfaces_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid model"))
        .mount(&server)
        .await;

    let mut rag = SlidesRag::new(lm_for(&server, 32));
    let err = rag.forward("q").await.unwrap_err();
    assert!(matches!(err, RagError::Api { status: 422, .. }));
    assert!(rag.lm().history().is_empty());
}
