use taghive_provider::{LlmProvider, LlmRequest, OpenAiProvider, ResponseFormat};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_openai_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "message": {"content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5}
    })
}

fn mock_openai_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": {
            "type": "api_error",
            "message": message
        }
    }))
}

fn structured_request() -> LlmRequest {
    LlmRequest::simple("gpt-4o".into(), "classify this".into())
        .with_temperature(0.0)
        .with_response_format(ResponseFormat::JsonSchema {
            name: "classification_result".into(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {"category": {"type": "string"}},
                "required": ["category"],
                "additionalProperties": false
            }),
            strict: true,
        })
}

#[tokio::test]
async fn openai_chat_sends_headers_and_structured_output_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "temperature": 0.0,
            "messages": [{"role": "user", "content": "classify this"}],
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "classification_result", "strict": true}
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_openai_response("{\"category\":\"Other\"}")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key", server.uri());
    let resp = provider.chat(structured_request()).await.unwrap();

    assert_eq!(resp.text, "{\"category\":\"Other\"}");
    assert_eq!(resp.input_tokens, Some(10));
    assert_eq!(resp.output_tokens, Some(5));
    assert_eq!(resp.stop_reason.as_deref(), Some("end_turn"));
}

#[tokio::test]
async fn openai_unauthorized_surfaces_api_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(mock_openai_error(401, "Incorrect API key provided"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("bad-key", server.uri());
    let err = provider.chat(structured_request()).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("401"));
    assert!(text.contains("Incorrect API key provided"));
    assert!(!text.contains("[retryable]"));
}

#[tokio::test]
async fn openai_rate_limit_is_marked_retryable_but_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(mock_openai_error(429, "quota exceeded"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key", server.uri());
    let err = provider.chat(structured_request()).await.unwrap_err();
    assert!(err.to_string().contains("[retryable]"));
}

#[tokio::test]
async fn openai_server_error_without_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key", server.uri());
    let err = provider.chat(structured_request()).await.unwrap_err();
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn openai_connection_refused_is_an_error() {
    let provider = OpenAiProvider::with_timeout("test-key", "http://127.0.0.1:9", 2);
    assert!(provider.chat(structured_request()).await.is_err());
}
