//! Application context: the loaded config, where it lives, and the provider
//! clients built from it.
//!
//! Settings change through [`AppContext::save_settings`] only. That persists
//! the new config first and then rebuilds every client from it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::core::config::{default_config_path, Config, ConfigError};
use crate::core::history::default_history_dir;
use crate::core::providers::{
    HttpTransport, ProviderClient, ProviderId, ProviderRegistry, ReqwestTransport,
};

pub struct AppContext {
    config_path: PathBuf,
    config: Config,
    transport: Arc<dyn HttpTransport>,
    registry: ProviderRegistry,
}

impl AppContext {
    /// Load (or create) the config and build the production clients.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = config_path.unwrap_or_else(default_config_path);
        let config = Config::load_or_init(&config_path)?;
        Ok(Self::from_parts(
            config_path,
            config,
            Arc::new(ReqwestTransport::new()),
        ))
    }

    pub fn from_parts(
        config_path: PathBuf,
        config: Config,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let registry = ProviderRegistry::from_config(&config, transport.clone());
        Self {
            config_path,
            config,
            transport,
            registry,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Configured history directory, or the default under the data dir.
    pub fn history_dir(&self) -> PathBuf {
        self.config
            .history_dir
            .clone()
            .unwrap_or_else(default_history_dir)
    }

    pub fn client(&self, id: ProviderId) -> Option<Arc<dyn ProviderClient>> {
        self.registry.get(id)
    }

    /// Apply `mutate` to a copy of the config, persist it, then swap it in and
    /// rebuild the clients. On a write failure nothing changes.
    pub fn save_settings<F>(&mut self, mutate: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut Config),
    {
        let mut updated = self.config.clone();
        mutate(&mut updated);
        updated.save_to_path(&self.config_path)?;
        self.registry = ProviderRegistry::from_config(&updated, self.transport.clone());
        self.config = updated;
        info!("settings saved; provider clients rebuilt");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::ReplyStatus;
    use crate::utils::test_utils::RecordingTransport;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_settings_persists_and_rebuilds_clients() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let transport = Arc::new(RecordingTransport::new());
        transport.respond(200, r#"{"choices":[{"message":{"content":"pong"}}]}"#);
        let mut ctx = AppContext::from_parts(path.clone(), Config::default(), transport.clone());

        let before = ctx.client(ProviderId::DeepSeek).unwrap().get_response("ping").await;
        assert_eq!(before.status, ReplyStatus::Unconfigured);

        ctx.save_settings(|c| c.set_api_key(ProviderId::DeepSeek, "k"))
            .unwrap();

        let after = ctx.client(ProviderId::DeepSeek).unwrap().get_response("ping").await;
        assert_eq!(after.text, "pong");
        assert_eq!(
            Config::load_from_path(&path).unwrap().api_key(ProviderId::DeepSeek),
            Some("k")
        );
    }

    #[test]
    fn failed_save_leaves_config_untouched() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the persist step fail.
        let path = dir.path().join("config.toml");
        std::fs::create_dir(&path).unwrap();
        let mut ctx = AppContext::from_parts(
            path,
            Config::default(),
            Arc::new(RecordingTransport::new()),
        );

        let result = ctx.save_settings(|c| c.theme = Some("light".to_string()));

        assert!(result.is_err());
        assert_eq!(ctx.config().theme_name(), "dark");
    }
}
