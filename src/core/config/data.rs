use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::i18n::Language;
use crate::core::providers::ProviderId;

pub const DEFAULT_TYPING_INTERVAL_MS: u64 = 10;
pub const DEFAULT_CHARS_PER_TICK: usize = 1;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Optional per-provider endpoint and model overrides.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ProviderOverride {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Interface language ("zh" or "en")
    pub language: Option<Language>,
    /// UI theme name ("dark" or "light")
    pub theme: Option<String>,
    pub default_provider: Option<ProviderId>,
    /// Reveal assistant replies character by character
    pub typing_effect: Option<bool>,
    pub typing_interval_ms: Option<u64>,
    pub chars_per_tick: Option<usize>,
    /// How many saved transcripts the history view lists
    pub history_limit: Option<usize>,
    pub history_dir: Option<PathBuf>,
    /// Syntax highlighting for fenced code blocks
    pub syntax: Option<bool>,
    /// API keys keyed by provider id ("deepseek", "openai", "claude")
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderOverride>,
}

/// Everything a provider client needs to issue requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub id: ProviderId,
    /// Empty when the provider is unconfigured.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl ProviderConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Config {
    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }

    pub fn theme_name(&self) -> &str {
        self.theme.as_deref().unwrap_or("dark")
    }

    pub fn default_provider(&self) -> ProviderId {
        self.default_provider.unwrap_or(ProviderId::DeepSeek)
    }

    pub fn typing_effect(&self) -> bool {
        self.typing_effect.unwrap_or(true)
    }

    pub fn typing_interval_ms(&self) -> u64 {
        self.typing_interval_ms
            .unwrap_or(DEFAULT_TYPING_INTERVAL_MS)
            .max(1)
    }

    pub fn chars_per_tick(&self) -> usize {
        self.chars_per_tick.unwrap_or(DEFAULT_CHARS_PER_TICK).max(1)
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn api_key(&self, id: ProviderId) -> Option<&str> {
        self.api_keys
            .get(id.as_str())
            .map(String::as_str)
            .filter(|key| !key.trim().is_empty())
    }

    /// Store a key; an empty key removes the entry.
    pub fn set_api_key(&mut self, id: ProviderId, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            self.api_keys.remove(id.as_str());
        } else {
            self.api_keys.insert(id.as_str().to_string(), key.to_string());
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> ProviderConfig {
        let overrides = self.providers.get(id.as_str());
        let model = overrides
            .and_then(|o| o.model.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| id.default_model().to_string());
        let base_url = overrides
            .and_then(|o| o.base_url.clone())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| id.default_endpoint().to_string());
        ProviderConfig {
            id,
            api_key: self.api_key(id).unwrap_or_default().to_string(),
            model,
            base_url,
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths under the home directory to `~` notation on Unix.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
