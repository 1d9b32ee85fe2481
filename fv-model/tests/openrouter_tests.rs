use fv_core::{ChatMessage, ChatRequest, FvError, Llm};
use fv_model::retry::RetryConfig;
use fv_model::openrouter::PROVIDER_NAME;
use fv_model::{OpenRouterClient, OpenRouterConfig, parse_model_json};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-1",
        "model": "qwen/qwen-2.5-72b-instruct",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
    })
}

fn client_for(server: &MockServer) -> OpenRouterClient {
    OpenRouterClient::new(
        OpenRouterConfig::new("sk-or-test", "deepseek/deepseek-r1")
            .with_base_url(format!("{}/api/v1", server.uri()))
            .with_app_url("https://futurevalidate.test")
            .with_timeout(Duration::from_secs(5)),
    )
    .expect("client")
}

fn stage_request() -> ChatRequest {
    ChatRequest::new(vec![ChatMessage::user("Analyze the market")])
        .with_model("qwen/qwen-2.5-72b-instruct")
        .with_temperature(0.7)
        .with_max_tokens(2000)
}

#[tokio::test]
async fn sends_request_with_attribution_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-or-test"))
        .and(header("HTTP-Referer", "https://futurevalidate.test"))
        .and(header("X-Title", "FutureValidate"))
        .and(body_partial_json(json!({
            "model": "qwen/qwen-2.5-72b-instruct",
            "max_tokens": 2000,
            "messages": [{"role": "user", "content": "Analyze the market"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"tam\": 1}")))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).complete(stage_request()).await.unwrap();
    assert_eq!(response.content, "{\"tam\": 1}");
    assert_eq!(response.model, "qwen/qwen-2.5-72b-instruct");
    assert_eq!(response.usage.unwrap().total_tokens, 20);
}

#[tokio::test]
async fn falls_back_to_configured_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "deepseek/deepseek-r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new(vec![ChatMessage::user("hi")]);
    client_for(&server).complete(request).await.unwrap();
}

#[tokio::test]
async fn server_error_is_reported_as_retryable_model_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).complete(stage_request()).await.unwrap_err();
    match err {
        FvError::Model(message) => {
            assert!(message.contains("503"), "{message}");
            assert!(message.contains("retryable"), "{message}");
            assert!(message.contains("upstream overloaded"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bad_request_is_non_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad model"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_retry_config(
        RetryConfig::default()
            .with_max_retries(3)
            .with_delays(Duration::ZERO, Duration::ZERO),
    );
    let err = client.complete(stage_request()).await.unwrap_err();
    assert!(err.to_string().contains("non-retryable"));
}

#[tokio::test]
async fn retries_rate_limits_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"ok\": true}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_retry_config(
        RetryConfig::default()
            .with_max_retries(2)
            .with_delays(Duration::ZERO, Duration::ZERO),
    );
    let response = client.complete(stage_request()).await.unwrap();
    assert_eq!(response.content, "{\"ok\": true}");
}

#[tokio::test]
async fn gives_up_after_configured_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server).with_retry_config(
        RetryConfig::default()
            .with_max_retries(1)
            .with_delays(Duration::ZERO, Duration::ZERO),
    );
    let err = client.complete(stage_request()).await.unwrap_err();
    assert!(err.to_string().contains("502"));
}

#[test]
fn reports_backend_name_not_model() {
    let config = OpenRouterConfig::new("sk-or-test", "qwen/qwen-2.5-72b-instruct");
    let client = OpenRouterClient::new(config).unwrap();
    assert_eq!(client.name(), PROVIDER_NAME);
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(stage_request()).await.unwrap_err();
    assert!(err.to_string().contains("no choices"));
}

#[tokio::test]
async fn error_body_on_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": 402, "message": "Insufficient credits"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(stage_request()).await.unwrap_err();
    assert!(err.to_string().contains("Insufficient credits"));
}

#[tokio::test]
async fn fenced_content_parses_downstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("```json\n{\"viability_score\": 8.1}\n```")),
        )
        .mount(&server)
        .await;

    let response = client_for(&server).complete(stage_request()).await.unwrap();
    let parsed: serde_json::Value = parse_model_json(&response.content).unwrap();
    assert_eq!(parsed["viability_score"], 8.1);
}
