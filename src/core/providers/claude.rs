use std::sync::Arc;

use async_trait::async_trait;

use super::{
    execute, respond, HttpRequest, HttpTransport, ProviderClient, ProviderId, ProviderReply,
};
use crate::api::{AnthropicRequest, AnthropicResponse, ChatMessage};
use crate::core::config::ProviderConfig;
use crate::core::i18n::Language;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub struct ClaudeClient {
    provider: ProviderConfig,
    transport: Arc<dyn HttpTransport>,
    language: Language,
}

impl ClaudeClient {
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
        let body = AnthropicRequest {
            model: self.provider.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![ChatMessage::user(message)],
        };
        Ok(HttpRequest {
            url: self.provider.base_url.clone(),
            headers: vec![
                ("x-api-key".to_string(), self.provider.api_key.trim().to_string()),
                ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
            ],
            body: serde_json::to_value(body).map_err(|err| err.to_string())?,
        })
    }
}

#[async_trait]
impl ProviderClient for ClaudeClient {
    fn id(&self) -> ProviderId {
        ProviderId::Claude
    }

    async fn get_response(&self, message: &str) -> ProviderReply {
        respond(&self.provider, self.language, || async {
            let request = self.build_request(message)?;
            execute(
                self.transport.as_ref(),
                &self.provider,
                request,
                AnthropicResponse::first_text,
            )
            .await
        })
        .await
    }
}
