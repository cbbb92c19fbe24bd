use tracing::{info, warn};

use super::{App, ChatPhase, Overlay};
use crate::core::config::Config;
use crate::core::history;
use crate::core::providers::ProviderId;
use crate::ui::presenter::present;

impl App {
    pub fn select_provider(&mut self, provider: ProviderId) {
        if self.provider != provider {
            info!(%provider, "provider selected");
        }
        self.provider = provider;
    }

    pub fn cycle_provider(&mut self) {
        self.select_provider(self.provider.next());
    }

    pub fn toggle_theme(&mut self) {
        if self.refuse_while_presenting() {
            return;
        }
        let theme = self.theme.toggled();
        let name = theme.name.to_string();
        if self.save(|config| config.theme = Some(name)) {
            self.theme = theme;
            self.rebuild_view();
        }
    }

    pub fn toggle_language(&mut self) {
        if self.refuse_while_presenting() {
            return;
        }
        let language = self.language.toggle();
        if self.save(|config| config.language = Some(language)) {
            self.language = language;
            self.rebuild_view();
        }
    }

    pub fn set_typing_effect(&mut self, enabled: bool) {
        if self.save(|config| config.typing_effect = Some(enabled)) {
            self.typing_effect = enabled;
        }
    }

    /// Store a key (empty removes it) and announce it with a System message.
    pub fn set_api_key(&mut self, provider: ProviderId, key: &str) {
        if self.refuse_while_presenting() {
            return;
        }
        let key = key.trim().to_string();
        if self.save(|config| config.set_api_key(provider, &key)) {
            info!(%provider, "api key updated");
            self.post_system(self.language.strings().settings_updated);
        }
    }

    pub fn open_history(&mut self) {
        let limit = self.context.config().history_limit();
        match history::recent(self.store.dir(), limit) {
            Ok(entries) if entries.is_empty() => {
                self.overlay = Some(Overlay::History(
                    self.language.strings().history_empty.to_string(),
                ));
            }
            Ok(entries) => {
                self.overlay = Some(Overlay::History(history::format_entries(&entries)));
            }
            Err(err) => {
                warn!(error = %err, "failed to list history");
                self.status = Some(err.to_string());
                return;
            }
        }
        self.overlay_scroll = 0;
    }

    /// Handle a `/command` typed into the input box.
    pub fn process_command(&mut self, input: &str) {
        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let strings = self.language.strings();
        match command {
            "/help" => self.open_help(),
            "/history" => self.open_history(),
            "/theme" => self.toggle_theme(),
            "/lang" | "/language" => self.toggle_language(),
            "/quit" | "/exit" => self.request_exit(),
            "/provider" => match parts.next() {
                None => self.cycle_provider(),
                Some(name) => match name.parse::<ProviderId>() {
                    Ok(provider) => self.select_provider(provider),
                    Err(err) => self.status = Some(err),
                },
            },
            "/key" => {
                let provider = parts.next().and_then(|name| name.parse::<ProviderId>().ok());
                let key = parts.collect::<Vec<_>>().join(" ");
                match provider {
                    Some(provider) => self.set_api_key(provider, &key),
                    None => self.status = Some(strings.key_usage.to_string()),
                }
            }
            "/typing" => match parts.next() {
                Some("on") => self.set_typing_effect(true),
                Some("off") => self.set_typing_effect(false),
                _ => self.set_typing_effect(!self.typing_effect),
            },
            other => self.status = Some(format!("{}: {other}", strings.unknown_command)),
        }
    }

    fn refuse_while_presenting(&mut self) -> bool {
        if self.phase == ChatPhase::Presenting {
            self.status = Some(self.language.strings().busy_notice.to_string());
            return true;
        }
        false
    }

    fn save<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut Config),
    {
        match self.context.save_settings(mutate) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to save settings");
                self.status = Some(err.to_string());
                false
            }
        }
    }

    /// Re-present the whole transcript with the current theme and language.
    fn rebuild_view(&mut self) {
        self.view.reset(self.theme.clone());
        for message in self.transcript.messages() {
            present(message, self.renderer.as_ref(), self.language, &mut self.view);
        }
    }
}
