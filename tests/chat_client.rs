use serde_json::json;
use travel_booking::config::{ChatConfig, CircuitBreakerConfig};
use travel_booking::services::chat::{
    ChatClient, CircuitState, EMPTY_MESSAGE_REPLY, FALLBACK_REPLY, PERSONA_PROMPT,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, threshold: u32) -> ChatClient {
    ChatClient::new(
        ChatConfig {
            api_url: server.uri(),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            max_tokens: 64,
        },
        &CircuitBreakerConfig {
            failure_threshold: threshold,
            timeout_seconds: 3600,
        },
    )
}

#[tokio::test]
async fn reply_comes_from_the_service_with_persona_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(body_string_contains("friendly travel assistant"))
        .and(body_string_contains("Traveler: Best time to visit Goa?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "November to February." }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server, 3).reply("Best time to visit Goa?").await;
    assert_eq!(reply, "November to February.");
    assert!(PERSONA_PROMPT.contains("friendly travel assistant"));
}

#[tokio::test]
async fn service_failure_becomes_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let reply = client(&server, 3).reply("hello").await;
    assert_eq!(reply, FALLBACK_REPLY);
}

#[tokio::test]
async fn malformed_body_becomes_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert_eq!(client(&server, 3).reply("hello").await, FALLBACK_REPLY);
}

#[tokio::test]
async fn open_breaker_stops_calling_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let chat = client(&server, 2);
    for _ in 0..4 {
        assert_eq!(chat.reply("anyone there?").await, FALLBACK_REPLY);
    }
    assert_eq!(chat.breaker_state(), CircuitState::Open);
}

#[tokio::test]
async fn blank_message_is_answered_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(client(&server, 3).reply("   ").await, EMPTY_MESSAGE_REPLY);
}

#[tokio::test]
async fn missing_api_key_skips_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let chat = ChatClient::new(
        ChatConfig {
            api_url: server.uri(),
            api_key: String::new(),
            model: "m".to_string(),
            max_tokens: 16,
        },
        &CircuitBreakerConfig { failure_threshold: 1, timeout_seconds: 60 },
    );
    assert_eq!(chat.reply("hi").await, FALLBACK_REPLY);
    assert_eq!(chat.breaker_state(), CircuitState::Closed);
}
