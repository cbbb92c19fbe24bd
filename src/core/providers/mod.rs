//! Provider client adapters.
//!
//! Every vendor integration implements [`ProviderClient`]: one prompt in, one
//! [`ProviderReply`] out. Failures never cross this boundary as errors; they
//! come back as a reply whose text carries the localized error marker.

mod claude;
mod openai_compat;
pub mod transport;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::config::{Config, ProviderConfig};
use crate::core::i18n::Language;

pub use claude::ClaudeClient;
pub use openai_compat::ChatCompletionsClient;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    DeepSeek,
    #[serde(rename = "openai")]
    OpenAi,
    Claude,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::DeepSeek, ProviderId::OpenAi, ProviderId::Claude];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "deepseek",
            ProviderId::OpenAi => "openai",
            ProviderId::Claude => "claude",
        }
    }

    /// Brand name shown in the header and as the assistant's sender name.
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "DeepSeek AI",
            ProviderId::OpenAi => "ChatGPT",
            ProviderId::Claude => "Claude",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "deepseek-chat",
            ProviderId::OpenAi => "gpt-3.5-turbo",
            ProviderId::Claude => "claude-3-sonnet-20240229",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
            ProviderId::OpenAi => "https://api.openai.com/v1/chat/completions",
            ProviderId::Claude => "https://api.anthropic.com/v1/messages",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(ProviderId::DeepSeek),
            "openai" | "gpt" | "chatgpt" => Ok(ProviderId::OpenAi),
            "claude" | "anthropic" => Ok(ProviderId::Claude),
            other => Err(format!(
                "unknown provider '{other}' (expected deepseek, openai or claude)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Answer,
    Unconfigured,
    Failed,
}

/// What a provider hands back: display text plus how it came about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub text: String,
    pub status: ReplyStatus,
}

impl ProviderReply {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: ReplyStatus::Answer,
        }
    }

    pub fn unconfigured(language: Language, provider: ProviderId) -> Self {
        Self {
            text: language
                .strings()
                .configure_key_notice(provider.display_name()),
            status: ReplyStatus::Unconfigured,
        }
    }

    pub fn failed(language: Language, detail: &str) -> Self {
        Self {
            text: language.strings().error_text(detail),
            status: ReplyStatus::Failed,
        }
    }

    pub fn is_answer(&self) -> bool {
        self.status == ReplyStatus::Answer
    }
}

#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Never fails; errors are folded into the reply text.
    async fn get_response(&self, message: &str) -> ProviderReply;
}

/// POST `body`, check the status, decode `R` and pull out the reply text.
pub(crate) async fn execute<R, F>(
    transport: &dyn HttpTransport,
    provider: &ProviderConfig,
    request: HttpRequest,
    extract: F,
) -> Result<String, String>
where
    R: DeserializeOwned,
    F: FnOnce(R) -> Option<String>,
{
    debug!(provider = %provider.id, model = %provider.model, url = %request.url, "sending request");

    let response = transport
        .post_json(request)
        .await
        .map_err(|err| err.to_string())?;

    if !(200..300).contains(&response.status) {
        return Err(format_status_error(response.status, &response.body));
    }

    let decoded: R = serde_json::from_str(&response.body)
        .map_err(|err| format!("malformed response: {err}"))?;

    match extract(decoded) {
        Some(text) => {
            debug!(provider = %provider.id, chars = text.chars().count(), "received reply");
            Ok(text)
        }
        None => Err("response did not contain any text".to_string()),
    }
}

/// Shared adapter tail: unconfigured short-circuit and error folding.
pub(crate) async fn respond<Fut>(
    provider: &ProviderConfig,
    language: Language,
    call: impl FnOnce() -> Fut,
) -> ProviderReply
where
    Fut: std::future::Future<Output = Result<String, String>>,
{
    if !provider.is_configured() {
        debug!(provider = %provider.id, "no api key configured");
        return ProviderReply::unconfigured(language, provider.id);
    }
    match call().await {
        Ok(text) => ProviderReply::answer(text),
        Err(detail) => {
            warn!(provider = %provider.id, error = %detail, "provider request failed");
            ProviderReply::failed(language, &detail)
        }
    }
}

pub(crate) fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

const MAX_ERROR_BODY_CHARS: usize = 300;

pub(crate) fn format_status_error(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            return format!("HTTP {status}: {summary}");
        }
    }
    if trimmed.is_empty() {
        return format!("HTTP {status}");
    }
    let mut snippet: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        snippet.push('…');
    }
    format!("HTTP {status}: {snippet}")
}

/// One client per provider, rebuilt whenever settings change.
#[derive(Clone)]
pub struct ProviderRegistry {
    clients: BTreeMap<ProviderId, Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let language = config.language();
        let mut clients: BTreeMap<ProviderId, Arc<dyn ProviderClient>> = BTreeMap::new();
        for id in ProviderId::ALL {
            let provider = config.provider_config(id);
            let client: Arc<dyn ProviderClient> = match id {
                ProviderId::DeepSeek | ProviderId::OpenAi => Arc::new(
                    ChatCompletionsClient::new(provider, transport.clone(), language),
                ),
                ProviderId::Claude => {
                    Arc::new(ClaudeClient::new(provider, transport.clone(), language))
                }
            };
            clients.insert(id, client);
        }
        Self { clients }
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn ProviderClient>> {
        self.clients.get(&id).cloned()
    }

    pub fn ids(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.clients.keys().copied()
    }
}
