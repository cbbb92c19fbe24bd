use std::sync::Arc;

use async_trait::async_trait;

use super::{
    execute, respond, HttpRequest, HttpTransport, ProviderClient, ProviderId, ProviderReply,
};
use crate::api::{ChatCompletionResponse, ChatMessage, ChatRequest};
use crate::core::config::ProviderConfig;
use crate::core::i18n::Language;

/// OpenAI-style `/chat/completions` with bearer auth. Serves both DeepSeek
/// and OpenAI.
pub struct ChatCompletionsClient {
    provider: ProviderConfig,
    transport: Arc<dyn HttpTransport>,
    language: Language,
}

impl ChatCompletionsClient {
    pub fn new(
        provider: ProviderConfig,
        transport: Arc<dyn HttpTransport>,
        language: Language,
    ) -> Self {
        Self {
            provider,
            transport,
            language,
        }
    }

    fn build_request(&self, message: &str) -> Result<HttpRequest, String> {
        let body = ChatRequest {
            model: self.provider.model.clone(),
            messages: vec![ChatMessage::user(message)],
        };
        Ok(HttpRequest {
            url: self.provider.base_url.clone(),
            headers: vec![(
                "Authorization".to_string(),
                format!("Bearer {}", self.provider.api_key.trim()),
            )],
            body: serde_json::to_value(body).map_err(|err| err.to_string())?,
        })
    }
}

#[async_trait]
impl ProviderClient for ChatCompletionsClient {
    fn id(&self) -> ProviderId {
        self.provider.id
    }

    async fn get_response(&self, message: &str) -> ProviderReply {
        respond(&self.provider, self.language, || async {
            let request = self.build_request(message)?;
            execute(
                self.transport.as_ref(),
                &self.provider,
                request,
                ChatCompletionResponse::first_text,
            )
            .await
        })
        .await
    }
}
