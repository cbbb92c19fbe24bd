use std::sync::Arc;

use super::*;
use crate::core::config::Config;
use crate::utils::test_utils::RecordingTransport;

fn configured(id: ProviderId, key: &str) -> Config {
    let mut config = Config::default();
    config.language = Some(Language::En);
    config.set_api_key(id, key);
    config
}

fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn empty_key_short_circuits_without_network_call() {
    let transport = Arc::new(RecordingTransport::new());
    let mut config = Config::default();
    config.language = Some(Language::En);
    let registry = ProviderRegistry::from_config(&config, transport.clone());

    for id in ProviderId::ALL {
        let reply = registry.get(id).unwrap().get_response("hello").await;
        assert_eq!(reply.status, ReplyStatus::Unconfigured);
        assert_eq!(
            reply.text,
            format!("Please configure the {} API key first", id.display_name())
        );
    }
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn deepseek_request_shape_and_reply() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond(
        200,
        r#"{"choices":[{"message":{"role":"assistant","content":"Hi there"}}]}"#,
    );
    let config = configured(ProviderId::DeepSeek, "ds-secret");
    let registry = ProviderRegistry::from_config(&config, transport.clone());

    let reply = registry
        .get(ProviderId::DeepSeek)
        .unwrap()
        .get_response("hello")
        .await;

    assert_eq!(reply, ProviderReply::answer("Hi there"));
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.url, "https://api.deepseek.com/v1/chat/completions");
    assert_eq!(header(request, "authorization"), Some("Bearer ds-secret"));
    assert_eq!(
        request.body,
        serde_json::json!({
            "model": "deepseek-chat",
            "messages": [{"role": "user", "content": "hello"}]
        })
    );
}

#[tokio::test]
async fn openai_uses_its_own_endpoint_and_model() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond(200, r#"{"choices":[{"message":{"content":"ok"}}]}"#);
    let config = configured(ProviderId::OpenAi, "sk-1");
    let registry = ProviderRegistry::from_config(&config, transport.clone());

    let reply = registry.get(ProviderId::OpenAi).unwrap().get_response("q").await;

    assert!(reply.is_answer());
    let request = &transport.requests()[0];
    assert_eq!(request.url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(request.body["model"], "gpt-3.5-turbo");
}

#[tokio::test]
async fn claude_request_shape_and_reply() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond(
        200,
        r#"{"id":"msg_1","content":[{"type":"text","text":"Bonjour"}]}"#,
    );
    let config = configured(ProviderId::Claude, "ant-key");
    let registry = ProviderRegistry::from_config(&config, transport.clone());

    let reply = registry.get(ProviderId::Claude).unwrap().get_response("hi").await;

    assert_eq!(reply.text, "Bonjour");
    let request = &transport.requests()[0];
    assert_eq!(request.url, "https://api.anthropic.com/v1/messages");
    assert_eq!(header(request, "x-api-key"), Some("ant-key"));
    assert_eq!(header(request, "anthropic-version"), Some("2023-06-01"));
    assert_eq!(header(request, "authorization"), None);
    assert_eq!(request.body["max_tokens"], 1024);
    assert_eq!(request.body["model"], "claude-3-sonnet-20240229");
}

#[tokio::test]
async fn non_success_status_is_folded_into_error_text() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond(
        401,
        r#"{"error":{"message":"Invalid   API key","type":"auth"}}"#,
    );
    let config = configured(ProviderId::DeepSeek, "bad");
    let registry = ProviderRegistry::from_config(&config, transport.clone());

    let reply = registry.get(ProviderId::DeepSeek).unwrap().get_response("x").await;

    assert_eq!(reply.status, ReplyStatus::Failed);
    assert_eq!(reply.text, "Error: HTTP 401: Invalid API key");
}

#[tokio::test]
async fn malformed_and_empty_bodies_become_errors() {
    let transport = Arc::new(RecordingTransport::new());
    transport.respond(200, "not json");
    transport.respond(200, r#"{"choices":[]}"#);
    let config = configured(ProviderId::OpenAi, "k");
    let client = ProviderRegistry::from_config(&config, transport.clone())
        .get(ProviderId::OpenAi)
        .unwrap();

    let malformed = client.get_response("a").await;
    assert_eq!(malformed.status, ReplyStatus::Failed);
    assert!(malformed.text.starts_with("Error: malformed response"));

    let empty = client.get_response("b").await;
    assert_eq!(empty.text, "Error: response did not contain any text");
}

#[tokio::test]
async fn transport_failure_uses_localized_marker() {
    let transport = Arc::new(RecordingTransport::new());
    transport.fail("connection refused");
    let mut config = configured(ProviderId::Claude, "k");
    config.language = Some(Language::Zh);
    let client = ProviderRegistry::from_config(&config, transport.clone())
        .get(ProviderId::Claude)
        .unwrap();

    let reply = client.get_response("a").await;

    assert_eq!(reply.status, ReplyStatus::Failed);
    assert!(reply.text.starts_with("错误: request failed"));
    assert!(reply.text.contains("connection refused"));
}

#[test]
fn status_error_without_json_is_truncated() {
    let body = "x".repeat(400);
    let text = format_status_error(502, &body);
    assert!(text.starts_with("HTTP 502: xxx"));
    assert!(text.ends_with('…'));
    assert_eq!(format_status_error(500, "  "), "HTTP 500");
}

#[test]
fn provider_ids_parse_and_cycle() {
    assert_eq!("Anthropic".parse::<ProviderId>().unwrap(), ProviderId::Claude);
    assert_eq!("chatgpt".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
    assert!("mistral".parse::<ProviderId>().is_err());
    assert_eq!(ProviderId::DeepSeek.next(), ProviderId::OpenAi);
    assert_eq!(ProviderId::Claude.next(), ProviderId::DeepSeek);
}
