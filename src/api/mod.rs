//! Wire payloads for the provider HTTP APIs.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible `/chat/completions` request body.
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,
}

impl ChatCompletionResponse {
    pub fn first_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

/// Anthropic `/v1/messages` request body.
#[derive(Serialize, Debug)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug)]
pub struct AnthropicContentBlock {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<AnthropicContentBlock>,
}

impl AnthropicResponse {
    pub fn first_text(self) -> Option<String> {
        self.content.into_iter().next()?.text
    }
}
